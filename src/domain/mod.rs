// Domain layer - Plans, segments, render jobs and the rules over them

pub mod errors;
pub mod model;
pub mod rules;
