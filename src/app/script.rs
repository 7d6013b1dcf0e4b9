use crate::domain::EmailRequest;
use crate::infra::PacingSettings;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pacing {
    pub per_char: Duration,
    pub processing: Duration,
    pub welcome: Duration,
}

impl From<PacingSettings> for Pacing {
    fn from(settings: PacingSettings) -> Self {
        Self {
            per_char: Duration::from_millis(settings.per_char_ms),
            processing: Duration::from_millis(settings.processing_ms),
            welcome: Duration::from_millis(settings.welcome_ms),
        }
    }
}

impl Pacing {
    pub fn instant() -> Self {
        PacingSettings::instant().into()
    }

    /// How long a step waits after the previous one before it fires.
    pub fn delay_for(&self, step: &Step) -> Duration {
        match step {
            Step::Pause(duration) => *duration,
            Step::Say(text) => {
                let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                self.per_char.saturating_mul(chars)
            }
            Step::Clear | Step::Submit(_) => Duration::ZERO,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Step {
    Pause(Duration),
    Say(String),
    Clear,
    Submit(EmailRequest),
}

/// Output waiting to be "typed" into the transcript.
///
/// Steps fire strictly in order. Each one is due `delay_for(step)` after the
/// previous step fired, so a coarse tick rate does not stretch a long reply.
#[derive(Clone, Debug, Default)]
pub struct OutputScript {
    steps: VecDeque<Step>,
    anchor: Option<Instant>,
    due: Option<Instant>,
}

impl OutputScript {
    pub fn push(&mut self, step: Step) {
        self.steps.push_back(step);
    }

    pub fn say(&mut self, text: impl Into<String>) {
        self.push(Step::Say(text.into()));
    }

    pub fn is_idle(&self) -> bool {
        self.steps.is_empty()
    }

    /// Next step that is due at `now`; pauses are consumed silently.
    pub fn poll(&mut self, now: Instant, pacing: &Pacing) -> Option<Step> {
        loop {
            let front = self.steps.front()?;
            let due = match self.due {
                Some(due) => due,
                None => {
                    let start = self.anchor.unwrap_or(now);
                    let due = start + pacing.delay_for(front);
                    self.due = Some(due);
                    due
                }
            };
            if now < due {
                return None;
            }

            let step = self.steps.pop_front()?;
            self.due = None;
            self.anchor = if self.steps.is_empty() { None } else { Some(due) };
            if matches!(step, Step::Pause(_)) {
                continue;
            }
            return Some(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacing() -> Pacing {
        Pacing {
            per_char: Duration::from_millis(10),
            processing: Duration::from_millis(300),
            welcome: Duration::from_millis(500),
        }
    }

    #[test]
    fn say_waits_ten_millis_per_char() {
        let pacing = pacing();
        let start = Instant::now();
        let mut script = OutputScript::default();
        script.say("Ready");

        assert_eq!(script.poll(start, &pacing), None);
        assert_eq!(script.poll(start + Duration::from_millis(49), &pacing), None);
        assert_eq!(
            script.poll(start + Duration::from_millis(50), &pacing),
            Some(Step::Say("Ready".to_string()))
        );
        assert!(script.is_idle());
    }

    #[test]
    fn pauses_are_swallowed_and_delays_chain() {
        let pacing = pacing();
        let start = Instant::now();
        let mut script = OutputScript::default();
        script.push(Step::Pause(Duration::from_millis(300)));
        script.say("ab");
        script.say("cd");

        assert_eq!(script.poll(start, &pacing), None);
        // A single late tick releases both lines, each at its own due time.
        let late = start + Duration::from_millis(400);
        assert_eq!(script.poll(late, &pacing), Some(Step::Say("ab".to_string())));
        assert_eq!(script.poll(late, &pacing), Some(Step::Say("cd".to_string())));
        assert_eq!(script.poll(late, &pacing), None);
    }

    #[test]
    fn instant_pacing_drains_in_one_tick() {
        let pacing = Pacing::instant();
        let now = Instant::now();
        let mut script = OutputScript::default();
        script.push(Step::Pause(Duration::ZERO));
        script.say("one");
        script.push(Step::Clear);

        assert_eq!(script.poll(now, &pacing), Some(Step::Say("one".to_string())));
        assert_eq!(script.poll(now, &pacing), Some(Step::Clear));
        assert_eq!(script.poll(now, &pacing), None);
    }

    #[test]
    fn idle_script_does_not_carry_old_anchor() {
        let pacing = pacing();
        let start = Instant::now();
        let mut script = OutputScript::default();
        script.say("a");
        assert!(script.poll(start, &pacing).is_none());
        assert!(script.poll(start + Duration::from_millis(10), &pacing).is_some());

        let later = start + Duration::from_secs(5);
        script.say("bc");
        assert_eq!(script.poll(later, &pacing), None);
        assert_eq!(
            script.poll(later + Duration::from_millis(20), &pacing),
            Some(Step::Say("bc".to_string()))
        );
    }
}
