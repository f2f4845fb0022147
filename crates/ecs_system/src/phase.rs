//! Execution phases.

/// One named stage of system execution.
///
/// A process lifetime runs `PreInit` and `Init` once, then any number of
/// `Event`/`Run`/`Render` rounds driven by the host, then `Dispose` and
/// `PostDispose`. Every phase ends with exactly one world flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    PreInit,
    Init,
    Event,
    Run,
    Render,
    Dispose,
    PostDispose,
}

impl Phase {
    /// Every phase, in lifetime order.
    pub const ALL: [Phase; 7] = [
        Phase::PreInit,
        Phase::Init,
        Phase::Event,
        Phase::Run,
        Phase::Render,
        Phase::Dispose,
        Phase::PostDispose,
    ];

    /// Position of this phase in [`Phase::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lower-case name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::PreInit => "pre_init",
            Phase::Init => "init",
            Phase::Event => "event",
            Phase::Run => "run",
            Phase::Render => "render",
            Phase::Dispose => "dispose",
            Phase::PostDispose => "post_dispose",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
