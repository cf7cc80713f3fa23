/// Viewport widths below this are laid out as mobile.
pub const MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Pending,
    Ready,
}

/// One-shot latch that keeps environment-dependent output behind a neutral
/// placeholder until the first live render pass has happened.
#[derive(Debug, Default)]
pub struct HydrationGate {
    phase: Phase,
}

impl HydrationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Open the gate. Returns `true` only for the call that flipped it.
    pub fn mark_ready(&mut self) -> bool {
        let flipped = self.phase == Phase::Pending;
        self.phase = Phase::Ready;
        flipped
    }

    /// Yield once to the scheduler, then open the gate.
    pub async fn ready_on_next_tick(&mut self) -> bool {
        tokio::task::yield_now().await;
        self.mark_ready()
    }

    pub fn select<T>(&self, placeholder: T, content: impl FnOnce() -> T) -> T {
        if self.is_ready() {
            content()
        } else {
            placeholder
        }
    }
}

/// Read access to the current viewport, injected so tests can fake it.
pub trait Viewport {
    fn width(&self) -> Option<u32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Desktop,
    Mobile,
}

impl Layout {
    /// Desktop until the gate opens, then whatever the viewport says.
    pub fn detect(gate: &HydrationGate, viewport: &dyn Viewport) -> Self {
        if !gate.is_ready() {
            return Layout::Desktop;
        }
        match viewport.width() {
            Some(width) if width < MOBILE_BREAKPOINT => Layout::Mobile,
            _ => Layout::Desktop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedWidth(Option<u32>);

    impl Viewport for FixedWidth {
        fn width(&self) -> Option<u32> {
            self.0
        }
    }

    #[test]
    fn gate_starts_pending_and_latches_once() {
        let mut gate = HydrationGate::new();
        assert!(!gate.is_ready());
        assert!(gate.mark_ready());
        assert!(gate.is_ready());
        assert!(!gate.mark_ready());
        assert!(gate.is_ready());
    }

    #[test]
    fn select_shows_placeholder_until_ready() {
        let mut gate = HydrationGate::new();
        assert_eq!(gate.select("placeholder", || "content"), "placeholder");
        gate.mark_ready();
        assert_eq!(gate.select("placeholder", || "content"), "content");
    }

    #[tokio::test]
    async fn next_tick_opens_the_gate() {
        let mut gate = HydrationGate::new();
        assert!(gate.ready_on_next_tick().await);
        assert!(gate.is_ready());
        assert!(!gate.ready_on_next_tick().await);
    }

    #[test]
    fn layout_is_desktop_before_hydration() {
        let gate = HydrationGate::new();
        assert_eq!(Layout::detect(&gate, &FixedWidth(Some(320))), Layout::Desktop);
    }

    #[test]
    fn layout_follows_viewport_after_hydration() {
        let mut gate = HydrationGate::new();
        gate.mark_ready();
        assert_eq!(Layout::detect(&gate, &FixedWidth(Some(320))), Layout::Mobile);
        assert_eq!(Layout::detect(&gate, &FixedWidth(Some(768))), Layout::Desktop);
        assert_eq!(Layout::detect(&gate, &FixedWidth(None)), Layout::Desktop);
    }
}
