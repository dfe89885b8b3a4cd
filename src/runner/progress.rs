//! Spinner and progress-bar state advanced by the runner's ticker.

/// Spinner glyphs, cycled one per tick.
pub const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Progress climbs by this much per tick...
pub const STEP: u8 = 2;
/// ...until it reaches this ceiling; only completion moves it further.
pub const CEILING: u8 = 90;

pub const COMPLETE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressModel {
    label: &'static str,
    value: u8,
    frame: usize,
    done: bool,
}

impl ProgressModel {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: 0,
            frame: 0,
            done: false,
        }
    }

    pub fn tick(&mut self) {
        if self.done {
            return;
        }
        if self.value < CEILING {
            self.value = (self.value + STEP).min(CEILING);
        }
        self.frame = self.frame.wrapping_add(1);
    }

    /// Mark the run finished, whatever its outcome.
    pub fn complete(&mut self) {
        self.value = COMPLETE;
        self.done = true;
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn spinner(&self) -> char {
        SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()]
    }

    /// Busy label followed by the current spinner glyph.
    pub fn message(&self) -> String {
        format!("{}{}", self.label, self.spinner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let model = ProgressModel::new("Working ");
        assert_eq!(model.value(), 0);
        assert!(!model.is_done());
        assert_eq!(model.message(), "Working |");
    }

    #[test]
    fn test_climbs_in_steps_and_saturates() {
        let mut model = ProgressModel::new("x");
        model.tick();
        assert_eq!(model.value(), 2);
        for _ in 0..44 {
            model.tick();
        }
        assert_eq!(model.value(), 90);
        for _ in 0..100 {
            model.tick();
        }
        assert_eq!(model.value(), 90);
    }

    #[test]
    fn test_spinner_cycles() {
        let mut model = ProgressModel::new("Wait ");
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(model.spinner());
            model.tick();
        }
        assert_eq!(seen, ['|', '/', '-', '\\', '|']);
        assert_eq!(model.message(), "Wait /");
    }

    #[test]
    fn test_complete_jumps_to_full_and_freezes() {
        let mut model = ProgressModel::new("x");
        model.tick();
        model.complete();
        assert_eq!(model.value(), 100);
        model.tick();
        assert_eq!(model.value(), 100);
        assert!(model.is_done());
    }
}
