//! Deterministic storyboard generator
//!
//! Builds a plan from fixed per-style beat templates. Identical topic and
//! style always yield an identical plan.

use tracing::debug;

use crate::domain::model::*;
use crate::ports::*;

/// Topic used when the caller passes a blank one
const FALLBACK_TOPIC: &str = "your next big idea";

struct BeatTemplate {
    label: &'static str,
    caption: &'static str,
    narration: &'static str,
    visual_cue: &'static str,
    duration: f64,
}

struct StyleTemplate {
    title: &'static str,
    hook: &'static str,
    summary: &'static str,
    cta: &'static str,
    beats: &'static [BeatTemplate],
}

const EDUCATIONAL: StyleTemplate = StyleTemplate {
    title: "{topic} in 60 seconds",
    hook: "Most people get {topic} wrong. Here is the framework that fixes it.",
    summary: "A step-by-step breakdown of {topic} with one actionable move per beat.",
    cta: "Save this and try step one today.",
    beats: &[
        BeatTemplate {
            label: "Hook",
            caption: "You are doing {topic} the hard way",
            narration: "Stop scrolling. There is a faster way to handle {topic}.",
            visual_cue: "Bold title card with a crossed-out checklist",
            duration: 3.0,
        },
        BeatTemplate {
            label: "Step 1",
            caption: "Start with the outcome",
            narration: "Decide what a win with {topic} looks like before you touch anything.",
            visual_cue: "Target icon zooming in",
            duration: 4.5,
        },
        BeatTemplate {
            label: "Step 2",
            caption: "Break it into three moves",
            narration: "Split {topic} into three moves you can finish in one sitting.",
            visual_cue: "Three stacked cards sliding in",
            duration: 5.0,
        },
        BeatTemplate {
            label: "Step 3",
            caption: "Measure one number",
            narration: "Track a single metric so you know {topic} is actually improving.",
            visual_cue: "Line chart ticking upward",
            duration: 4.5,
        },
        BeatTemplate {
            label: "Recap",
            caption: "Outcome, moves, metric",
            narration: "That is the whole system for {topic}. Outcome, moves, metric.",
            visual_cue: "Checklist with all items ticked",
            duration: 3.5,
        },
    ],
};

const STORY: StyleTemplate = StyleTemplate {
    title: "The day {topic} changed everything",
    hook: "Nobody expected {topic} to end like this.",
    summary: "A short narrative arc about {topic} with a twist payoff.",
    cta: "Follow for part two.",
    beats: &[
        BeatTemplate {
            label: "Setup",
            caption: "It started with {topic}",
            narration: "It was an ordinary day until {topic} showed up.",
            visual_cue: "Slow push-in on a quiet street",
            duration: 3.5,
        },
        BeatTemplate {
            label: "Conflict",
            caption: "Then everything went wrong",
            narration: "Every plan around {topic} fell apart at once.",
            visual_cue: "Glitch transition with red tint",
            duration: 4.5,
        },
        BeatTemplate {
            label: "Turn",
            caption: "One small decision",
            narration: "One small decision about {topic} flipped the whole story.",
            visual_cue: "Split screen of two paths",
            duration: 4.5,
        },
        BeatTemplate {
            label: "Twist",
            caption: "The twist nobody saw",
            narration: "The problem was never {topic}. It was how we looked at it.",
            visual_cue: "Camera whip to a reveal shot",
            duration: 4.0,
        },
    ],
};

const PRODUCT: StyleTemplate = StyleTemplate {
    title: "Meet {topic}",
    hook: "This is the {topic} people keep asking about.",
    summary: "A launch teaser for {topic} with proof and urgency.",
    cta: "Tap the link before launch pricing ends.",
    beats: &[
        BeatTemplate {
            label: "Problem",
            caption: "Tired of the old way?",
            narration: "Everyone who needs {topic} hits the same wall.",
            visual_cue: "Frustrated user at a desk",
            duration: 3.0,
        },
        BeatTemplate {
            label: "Reveal",
            caption: "Introducing {topic}",
            narration: "{topic} removes that wall in a single step.",
            visual_cue: "Product hero shot on gradient",
            duration: 4.5,
        },
        BeatTemplate {
            label: "Proof",
            caption: "Loved by early users",
            narration: "Early users of {topic} say they will never go back.",
            visual_cue: "Floating review quotes",
            duration: 4.0,
        },
        BeatTemplate {
            label: "Urgency",
            caption: "Launch pricing ends soon",
            narration: "Launch pricing for {topic} will not last.",
            visual_cue: "Countdown timer",
            duration: 3.5,
        },
    ],
};

const MOTIVATIONAL: StyleTemplate = StyleTemplate {
    title: "Your {topic} moment",
    hook: "If {topic} feels impossible, this is for you.",
    summary: "A pep talk about {topic} with a mantra and a challenge.",
    cta: "Comment your first step below.",
    beats: &[
        BeatTemplate {
            label: "Truth",
            caption: "Nobody starts ready",
            narration: "Nobody who mastered {topic} felt ready on day one.",
            visual_cue: "Sunrise time-lapse",
            duration: 3.5,
        },
        BeatTemplate {
            label: "Mantra",
            caption: "Small reps, every day",
            narration: "Repeat it with me. Small reps, every day, on {topic}.",
            visual_cue: "Large kinetic typography",
            duration: 4.0,
        },
        BeatTemplate {
            label: "Challenge",
            caption: "Seven days starting now",
            narration: "Give {topic} ten minutes a day for the next seven days.",
            visual_cue: "Calendar with seven boxes",
            duration: 4.5,
        },
    ],
};

/// Template-driven plan source
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePlanSource;

impl TemplatePlanSource {
    pub fn new() -> Self {
        Self
    }

    fn template(style: PlanStyle) -> &'static StyleTemplate {
        match style {
            PlanStyle::Educational => &EDUCATIONAL,
            PlanStyle::Story => &STORY,
            PlanStyle::Product => &PRODUCT,
            PlanStyle::Motivational => &MOTIVATIONAL,
        }
    }
}

fn fill(template: &str, topic: &str) -> String {
    template.replace("{topic}", topic)
}

impl PlanSourcePort for TemplatePlanSource {
    fn generate_plan(&self, topic: &str, style: PlanStyle) -> Plan {
        let topic = match topic.trim() {
            "" => FALLBACK_TOPIC,
            trimmed => trimmed,
        };
        let template = Self::template(style);
        debug!("Generating {} plan for {:?}", style, topic);

        let segments = template
            .beats
            .iter()
            .enumerate()
            .map(|(index, beat)| Segment {
                id: format!("{}-{}", style.as_str(), index + 1),
                label: beat.label.to_string(),
                caption: fill(beat.caption, topic),
                narration: fill(beat.narration, topic),
                visual_cue: beat.visual_cue.to_string(),
                duration: beat.duration,
            })
            .collect();

        Plan {
            title: fill(template.title, topic),
            hook: fill(template.hook, topic),
            summary: fill(template.summary, topic),
            cta: template.cta.to_string(),
            segments,
        }
    }
}
