use log::debug;

use crate::*;

/// The framing score of one group through time.
#[derive(PartialEq, Debug, Clone)]
pub struct TrajectoryChart {
    pub title: String,
    /// Sorted by year. May be empty if the selection matches no row.
    pub points: Vec<SeriesPoint>,
    pub range: DisplayRange,
    /// The horizontal reference line, always drawn.
    pub hline: f64,
}

/// The change points of all the groups of a region.
#[derive(PartialEq, Debug, Clone)]
pub struct ChangeChart {
    pub region: String,
    /// One bar per group, the largest counts first.
    pub bars: Vec<GroupChangeTotal>,
    /// The sum of the change points of the region, one point per year.
    pub yearly: Vec<RegionYearTotal>,
    pub range: DisplayRange,
}

#[derive(PartialEq, Debug, Clone)]
pub enum ChartView {
    Trajectory(TrajectoryChart),
    Changes(ChangeChart),
    /// Placeholder shown while the selection is incomplete.
    Empty,
}

impl ChartView {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartView::Trajectory(t) => t.points.is_empty(),
            ChartView::Changes(c) => c.bars.is_empty() && c.yearly.is_empty(),
            ChartView::Empty => true,
        }
    }
}

pub const ZERO_LINE: f64 = 0.0;

pub fn trajectory_chart(
    ctx: &DataContext,
    region: &str,
    group: &str,
    range: &DisplayRange,
) -> ChartView {
    let points = ctx.series_for(region, group);
    debug!(
        "trajectory_chart: {:?} / {:?}: {} points",
        region,
        group,
        points.len()
    );
    ChartView::Trajectory(TrajectoryChart {
        title: group.to_string(),
        points,
        range: *range,
        hline: ZERO_LINE,
    })
}

pub fn change_chart(ctx: &DataContext, region: &str, range: &DisplayRange) -> ChartView {
    let bars = ctx.change_totals_in_region(region);
    let yearly = ctx.yearly_totals_in_region(region);
    debug!(
        "change_chart: {:?}: {} bars, {} years",
        region,
        bars.len(),
        yearly.len()
    );
    ChartView::Changes(ChangeChart {
        region: region.to_string(),
        bars,
        yearly,
        range: *range,
    })
}
