pub use crate::charts::*;
pub use crate::config::*;

use log::{debug, warn};

use crate::DataContext;

/// What is currently selected in the dashboard.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SelectionState {
    NoRegion,
    RegionOnly(String),
    RegionAndGroup(String, String),
}

impl SelectionState {
    pub fn region(&self) -> Option<&str> {
        match self {
            SelectionState::NoRegion => None,
            SelectionState::RegionOnly(r) | SelectionState::RegionAndGroup(r, _) => Some(r),
        }
    }

    pub fn group(&self) -> Option<&str> {
        match self {
            SelectionState::RegionAndGroup(_, g) => Some(g),
            _ => None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SelectionEvent {
    /// Resets the group selection.
    SelectRegion(String),
    SelectGroup(String),
    ClearGroup,
}

/// Which chart the dashboard shows.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ViewKind {
    /// The framing score of the selected group.
    Trajectory,
    /// The change point tallies of the selected region.
    Changes,
}

/// The outcome of one event.
#[derive(PartialEq, Debug, Clone)]
pub struct Transition {
    pub state: SelectionState,
    /// The new options for the group selector, only when the region changed.
    pub group_options: Option<Vec<String>>,
    pub chart: ChartView,
}

/// A dashboard session over an immutable data context.
///
/// Changing the region recomputes the group options and resets the group. Changing
/// the region or the group recomputes the chart.
///
/// ```
/// use framing_shift::selection::*;
/// use framing_shift::{DataContext, GroupYearRecord};
///
/// let ctx = DataContext::new(vec![GroupYearRecord {
///     group_id: 1,
///     group_name: "Anna".to_string(),
///     region: "Asia".to_string(),
///     year: 2001,
///     frame_score: 0.5,
///     delta_flag: true,
/// }]);
///
/// let mut session = Session::with_default_region(&ctx, DisplayRange::DEFAULT, ViewKind::Trajectory);
/// assert_eq!(session.group_options(), vec!["Anna"]);
///
/// let t = session.apply(SelectionEvent::SelectGroup("Anna".to_string()));
/// assert!(!t.chart.is_empty());
/// ```
pub struct Session<'a> {
    ctx: &'a DataContext,
    range: DisplayRange,
    view: ViewKind,
    state: SelectionState,
}

impl<'a> Session<'a> {
    pub fn new(ctx: &'a DataContext, range: DisplayRange, view: ViewKind) -> Session<'a> {
        Session {
            ctx,
            range,
            view,
            state: SelectionState::NoRegion,
        }
    }

    /// Starts a session with the first region selected, if there is one.
    pub fn with_default_region(
        ctx: &'a DataContext,
        range: DisplayRange,
        view: ViewKind,
    ) -> Session<'a> {
        let mut s = Session::new(ctx, range, view);
        if let Some(first) = ctx.regions().first() {
            s.state = SelectionState::RegionOnly(first.to_string());
        }
        s
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn group_options(&self) -> Vec<String> {
        match self.state.region() {
            Some(r) => self
                .ctx
                .groups_in_region(r)
                .iter()
                .map(|g| g.to_string())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn apply(&mut self, event: SelectionEvent) -> Transition {
        debug!("Session::apply: {:?} in state {:?}", event, self.state);
        let (next, region_changed) = match (&self.state, event) {
            (_, SelectionEvent::SelectRegion(r)) => (SelectionState::RegionOnly(r), true),
            (SelectionState::NoRegion, SelectionEvent::SelectGroup(g)) => {
                warn!("Session::apply: group {:?} selected before any region, ignored", g);
                (SelectionState::NoRegion, false)
            }
            (SelectionState::RegionOnly(r), SelectionEvent::SelectGroup(g))
            | (SelectionState::RegionAndGroup(r, _), SelectionEvent::SelectGroup(g)) => {
                (SelectionState::RegionAndGroup(r.clone(), g), false)
            }
            (SelectionState::NoRegion, SelectionEvent::ClearGroup) => {
                (SelectionState::NoRegion, false)
            }
            (SelectionState::RegionOnly(r), SelectionEvent::ClearGroup)
            | (SelectionState::RegionAndGroup(r, _), SelectionEvent::ClearGroup) => {
                (SelectionState::RegionOnly(r.clone()), false)
            }
        };
        self.state = next;
        let group_options = if region_changed {
            Some(self.group_options())
        } else {
            None
        };
        Transition {
            state: self.state.clone(),
            group_options,
            chart: self.chart(),
        }
    }

    /// Switches the chart kind, keeping the selection.
    pub fn set_view(&mut self, view: ViewKind) -> Transition {
        self.view = view;
        Transition {
            state: self.state.clone(),
            group_options: None,
            chart: self.chart(),
        }
    }

    /// The chart for the current selection and view.
    pub fn chart(&self) -> ChartView {
        match (self.view, &self.state) {
            (_, SelectionState::NoRegion) => ChartView::Empty,
            (ViewKind::Trajectory, SelectionState::RegionOnly(_)) => ChartView::Empty,
            (ViewKind::Trajectory, SelectionState::RegionAndGroup(r, g)) => {
                trajectory_chart(self.ctx, r, g, &self.range)
            }
            (ViewKind::Changes, SelectionState::RegionOnly(r))
            | (ViewKind::Changes, SelectionState::RegionAndGroup(r, _)) => {
                change_chart(self.ctx, r, &self.range)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn region_change_resets_group() {
        let ctx = DataContext::new(sample());
        let mut s = Session::new(&ctx, DisplayRange::DEFAULT, ViewKind::Trajectory);
        assert_eq!(s.state(), &SelectionState::NoRegion);
        assert_eq!(s.chart(), ChartView::Empty);

        let t = s.apply(SelectionEvent::SelectRegion("Asia".to_string()));
        assert_eq!(t.state, SelectionState::RegionOnly("Asia".to_string()));
        assert_eq!(
            t.group_options,
            Some(vec!["Taliban".to_string(), "Abu Sayyaf Group".to_string()])
        );
        assert_eq!(t.chart, ChartView::Empty);

        let t = s.apply(SelectionEvent::SelectGroup("Taliban".to_string()));
        assert_eq!(
            t.state,
            SelectionState::RegionAndGroup("Asia".to_string(), "Taliban".to_string())
        );
        assert_eq!(t.group_options, None);
        assert!(!t.chart.is_empty());

        let t = s.apply(SelectionEvent::SelectRegion("Middle East".to_string()));
        assert_eq!(t.state, SelectionState::RegionOnly("Middle East".to_string()));
        assert_eq!(t.group_options, Some(vec!["Hamas".to_string()]));
        assert_eq!(t.chart, ChartView::Empty);
    }

    #[test]
    fn group_without_region_is_ignored() {
        let ctx = DataContext::new(sample());
        let mut s = Session::new(&ctx, DisplayRange::DEFAULT, ViewKind::Trajectory);
        let t = s.apply(SelectionEvent::SelectGroup("Taliban".to_string()));
        assert_eq!(t.state, SelectionState::NoRegion);
        assert_eq!(t.chart, ChartView::Empty);
    }

    #[test]
    fn clear_group_keeps_region() {
        let ctx = DataContext::new(sample());
        let mut s = Session::with_default_region(&ctx, DisplayRange::DEFAULT, ViewKind::Trajectory);
        assert_eq!(s.state().region(), Some("Asia"));
        s.apply(SelectionEvent::SelectGroup("Abu Sayyaf Group".to_string()));
        let t = s.apply(SelectionEvent::ClearGroup);
        assert_eq!(t.state, SelectionState::RegionOnly("Asia".to_string()));
        assert_eq!(t.state.group(), None);
    }

    #[test]
    fn changes_view_needs_only_a_region() {
        let ctx = DataContext::new(sample());
        let mut s = Session::with_default_region(&ctx, DisplayRange::DEFAULT, ViewKind::Changes);
        match s.chart() {
            ChartView::Changes(c) => assert_eq!(c.region, "Asia"),
            x => panic!("unexpected chart {:?}", x),
        }
        let t = s.set_view(ViewKind::Trajectory);
        assert_eq!(t.chart, ChartView::Empty);
    }

    #[test]
    fn empty_context_has_no_default_region() {
        let ctx = DataContext::new(Vec::new());
        let s = Session::with_default_region(&ctx, DisplayRange::DEFAULT, ViewKind::Changes);
        assert_eq!(s.state(), &SelectionState::NoRegion);
        assert!(s.group_options().is_empty());
        assert_eq!(s.chart(), ChartView::Empty);
    }
}
