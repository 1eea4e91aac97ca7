//! Named status LED patterns.
//!
//! Each pattern is a fixed table of on/off steps, rendered once per
//! [`StatusIndicator::signal`](crate::app::ports::StatusIndicator::signal)
//! call by [`BlinkLed`](super::status_led::BlinkLed).
//!
//! | Pattern     | Shape                                  | Meaning          |
//! |-------------|----------------------------------------|------------------|
//! | Heartbeat   | 500 ms on, 500 ms off                  | normal operation |
//! | Updating    | 10 × (100 ms on, 100 ms off)           | update running   |
//! | Error       | SOS: 3 short, 3 long, 3 short          | apply/init fault |

/// One segment of a pattern: hold the LED at `on` for `ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkStep {
    pub on: bool,
    pub ms: u32,
}

const fn on(ms: u32) -> BlinkStep {
    BlinkStep { on: true, ms }
}

const fn off(ms: u32) -> BlinkStep {
    BlinkStep { on: false, ms }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Heartbeat,
    Updating,
    Error,
}

const HEARTBEAT: [BlinkStep; 2] = [on(500), off(500)];

const UPDATING: [BlinkStep; 20] = {
    let mut steps = [off(100); 20];
    let mut i = 0;
    while i < 20 {
        steps[i] = on(100);
        i += 2;
    }
    steps
};

#[rustfmt::skip]
const SOS: [BlinkStep; 20] = [
    on(100), off(100), on(100), off(100), on(100), off(100),
    off(300),
    on(300), off(300), on(300), off(300), on(300), off(300),
    off(300),
    on(100), off(100), on(100), off(100), on(100), off(100),
];

impl Pattern {
    pub fn steps(self) -> &'static [BlinkStep] {
        match self {
            Self::Heartbeat => &HEARTBEAT,
            Self::Updating => &UPDATING,
            Self::Error => &SOS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::Updating => "updating",
            Self::Error => "error",
        }
    }

    /// Total time one rendering takes.
    pub fn duration_ms(self) -> u32 {
        self.steps().iter().map(|s| s.ms).sum()
    }
}
