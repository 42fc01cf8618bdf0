use crate::types::{BuildMode, BuildStrategy};

/// Pick the build strategy for this run.
///
/// Forced modes are returned as-is whatever the lock state; the executor of
/// each strategy checks its own precondition.
pub fn select_strategy(mode: BuildMode, editor_running: bool) -> BuildStrategy {
    match mode {
        BuildMode::Batchmode => BuildStrategy::Batchmode,
        BuildMode::Trigger => BuildStrategy::Trigger,
        BuildMode::Auto if editor_running => BuildStrategy::Trigger,
        BuildMode::Auto => BuildStrategy::Batchmode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batchmode_iff_forced_or_auto_and_closed() {
        for &mode in BuildMode::all() {
            for running in [false, true] {
                let expected = if mode == BuildMode::Batchmode
                    || (mode == BuildMode::Auto && !running)
                {
                    BuildStrategy::Batchmode
                } else {
                    BuildStrategy::Trigger
                };
                assert_eq!(
                    select_strategy(mode, running),
                    expected,
                    "mode={mode} running={running}"
                );
            }
        }
    }

    #[test]
    fn auto_follows_lock_state() {
        assert_eq!(select_strategy(BuildMode::Auto, false), BuildStrategy::Batchmode);
        assert_eq!(select_strategy(BuildMode::Auto, true), BuildStrategy::Trigger);
    }

    #[test]
    fn forced_batchmode_ignores_running_editor() {
        assert_eq!(
            select_strategy(BuildMode::Batchmode, true),
            BuildStrategy::Batchmode
        );
    }
}
