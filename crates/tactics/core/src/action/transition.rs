use crate::env::BattleEnv;
use crate::rng::RngService;
use crate::state::BattleState;

use super::{ActionResolution, Rejection};

/// Defines how a concrete command checks and then mutates the battle state.
///
/// `pre_validate` runs every gate against the state **before** mutation and
/// produces a plan; a rejection there leaves the state untouched and consumes
/// no randomness. `apply` performs the rolls and writes the plan.
pub trait ActionTransition {
    /// Data computed by validation and consumed by `apply`.
    type Plan;

    fn pre_validate(
        &self,
        state: &BattleState,
        env: &BattleEnv<'_>,
    ) -> Result<Self::Plan, Rejection>;

    fn apply(
        &self,
        plan: Self::Plan,
        state: &mut BattleState,
        env: &BattleEnv<'_>,
        rng: &mut dyn RngService,
    ) -> ActionResolution;

    /// Validates then applies. Does not log or advance the tick; that is the
    /// resolver's job.
    fn execute(
        &self,
        state: &mut BattleState,
        env: &BattleEnv<'_>,
        rng: &mut dyn RngService,
    ) -> ActionResolution {
        match self.pre_validate(state, env) {
            Ok(plan) => self.apply(plan, state, env, rng),
            Err(rejection) => rejection.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::action::FailureReason;
    use crate::map::BattleMap;
    use crate::rng::ScriptedRng;

    struct CountingAction<'a> {
        allow: bool,
        applied: &'a Cell<u32>,
    }

    impl ActionTransition for CountingAction<'_> {
        type Plan = ();

        fn pre_validate(&self, _: &BattleState, _: &BattleEnv<'_>) -> Result<(), Rejection> {
            if self.allow {
                Ok(())
            } else {
                Err(Rejection::new(FailureReason::InvalidPolicy, "denied"))
            }
        }

        fn apply(
            &self,
            _: (),
            _: &mut BattleState,
            _: &BattleEnv<'_>,
            _: &mut dyn RngService,
        ) -> ActionResolution {
            self.applied.set(self.applied.get() + 1);
            ActionResolution::succeeded("applied")
        }
    }

    #[test]
    fn rejected_validation_skips_apply() {
        let map = BattleMap::legacy();
        let env = BattleEnv::new(&map);
        let mut state = BattleState::new();
        let mut rng = ScriptedRng::new([]);
        let applied = Cell::new(0);

        let denied = CountingAction {
            allow: false,
            applied: &applied,
        };
        let resolution = denied.execute(&mut state, &env, &mut rng);
        assert!(resolution.is_rejected());
        assert_eq!(applied.get(), 0);

        let allowed = CountingAction {
            allow: true,
            applied: &applied,
        };
        assert!(allowed.execute(&mut state, &env, &mut rng).success);
        assert_eq!(applied.get(), 1);
    }
}
