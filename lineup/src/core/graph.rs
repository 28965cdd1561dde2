//! Deterministic selection logic for the action graph.
//!
//! An action graph is an ordered table of [`ActionSpec`]s. Each spec names the
//! conditions that must hold before it runs and the conditions it claims to
//! establish. The driver repeatedly asks [`select_action`] what to do next and
//! stops on [`Selection::GoalReached`] or [`Selection::Stuck`].

/// Declarative entry in an action table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec<A, C: 'static> {
    pub id: A,
    /// Conditions that must all hold for the action to be eligible.
    pub pre: &'static [C],
    /// Conditions the action establishes on success.
    pub post: &'static [C],
    /// Whether the action may run again after it has already executed once.
    pub rerunnable: bool,
}

/// What the driver should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<A> {
    /// The goal condition holds; the run is complete.
    GoalReached,
    /// Run this action next.
    Run(A),
    /// No eligible action remains and the goal is unmet.
    Stuck,
}

/// Pick the first eligible action in declaration order.
///
/// An action is eligible when all of its preconditions hold, at least one of
/// its postconditions does not, and it is either rerunnable or absent from
/// `executed`.
pub fn select_action<A, C, F>(
    actions: &[ActionSpec<A, C>],
    goal: C,
    executed: &[A],
    holds: F,
) -> Selection<A>
where
    A: Copy + PartialEq,
    C: Copy,
    F: Fn(C) -> bool,
{
    if holds(goal) {
        return Selection::GoalReached;
    }

    actions
        .iter()
        .find(|action| is_eligible(action, executed, &holds))
        .map_or(Selection::Stuck, |action| Selection::Run(action.id))
}

fn is_eligible<A, C, F>(action: &ActionSpec<A, C>, executed: &[A], holds: &F) -> bool
where
    A: Copy + PartialEq,
    C: Copy,
    F: Fn(C) -> bool,
{
    if !action.rerunnable && executed.contains(&action.id) {
        return false;
    }
    let pre_met = action.pre.iter().all(|condition| holds(*condition));
    let post_met = action.post.iter().all(|condition| holds(*condition));
    pre_met && !post_met
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Cond {
        Ready,
        Built,
        Shipped,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Act {
        Prepare,
        Build,
        Ship,
    }

    const TABLE: [ActionSpec<Act, Cond>; 3] = [
        ActionSpec {
            id: Act::Prepare,
            pre: &[],
            post: &[Cond::Ready],
            rerunnable: false,
        },
        ActionSpec {
            id: Act::Build,
            pre: &[Cond::Ready],
            post: &[Cond::Built],
            rerunnable: true,
        },
        ActionSpec {
            id: Act::Ship,
            pre: &[Cond::Built],
            post: &[Cond::Shipped],
            rerunnable: false,
        },
    ];

    fn select(facts: &[Cond], executed: &[Act]) -> Selection<Act> {
        let facts: HashSet<Cond> = facts.iter().copied().collect();
        select_action(&TABLE, Cond::Shipped, executed, |c| facts.contains(&c))
    }

    #[test]
    fn goal_short_circuits_selection() {
        assert_eq!(select(&[Cond::Shipped], &[]), Selection::GoalReached);
    }

    #[test]
    fn selects_first_action_with_unmet_postconditions() {
        assert_eq!(select(&[], &[]), Selection::Run(Act::Prepare));
        assert_eq!(
            select(&[Cond::Ready], &[Act::Prepare]),
            Selection::Run(Act::Build)
        );
        assert_eq!(
            select(&[Cond::Ready, Cond::Built], &[Act::Prepare, Act::Build]),
            Selection::Run(Act::Ship)
        );
    }

    #[test]
    fn rerunnable_action_stays_eligible_after_executing() {
        let executed = [Act::Prepare, Act::Build, Act::Build];
        assert_eq!(select(&[Cond::Ready], &executed), Selection::Run(Act::Build));
    }

    #[test]
    fn non_rerunnable_action_is_not_repeated() {
        // Prepare already ran but did not establish Ready: nothing else can run.
        assert_eq!(select(&[], &[Act::Prepare]), Selection::Stuck);
    }

    #[test]
    fn stuck_when_no_preconditions_hold() {
        let table = [ActionSpec {
            id: Act::Ship,
            pre: &[Cond::Built],
            post: &[Cond::Shipped],
            rerunnable: true,
        }];
        let outcome = select_action(&table, Cond::Shipped, &[], |_| false);
        assert_eq!(outcome, Selection::Stuck);
    }
}
