mod config;
pub mod charts;
pub mod selection;

use log::{debug, info, warn};

use std::collections::{BTreeMap, HashMap, HashSet};

pub use crate::config::*;

/// Names longer than this are shortened on chart axes.
pub const LABEL_MAX_CHARS: usize = 18;
/// Number of characters kept from a name that is shortened.
pub const LABEL_KEPT_CHARS: usize = 21;
pub const LABEL_ELLIPSIS: &str = "..";

// ********* Identity resolution **********

/// Splits the display names that are shared by several dataset identifiers.
///
/// Each record whose identifier is in the remap table is renamed to its base name
/// followed by the suffix of the table. The base name is the current name without
/// that suffix, so applying the function a second time does not change anything.
///
/// As a consequence, a source name that already ends with its own suffix is kept
/// unchanged: with the suffixes `1` and `2`, two groups both named `Unit 1` become
/// `Unit 1` and `Unit 12`. The names are still distinct.
pub fn resolve_identities(
    records: &[GroupYearRecord],
    remap: &IdentityRemap,
) -> Vec<GroupYearRecord> {
    let mut renamed = 0;
    let res: Vec<GroupYearRecord> = records
        .iter()
        .map(|r| match remap.suffix_for(r.group_id) {
            Some(suffix) => {
                let base = r.group_name.strip_suffix(suffix).unwrap_or(r.group_name.as_str());
                let mut r2 = r.clone();
                r2.group_name = format!("{}{}", base, suffix);
                if r2.group_name != r.group_name {
                    renamed += 1;
                }
                r2
            }
            None => r.clone(),
        })
        .collect();
    debug!(
        "resolve_identities: {} records, {} renamed with {} remap entries",
        res.len(),
        renamed,
        remap.entries.len()
    );
    res
}

/// Shortens a group name for display.
///
/// Names of at most 18 characters are kept as is. Longer names are cut to
/// their first 21 characters followed by `..`.
pub fn truncate_label(name: &str) -> String {
    if name.chars().count() > LABEL_MAX_CHARS {
        let kept: String = name.chars().take(LABEL_KEPT_CHARS).collect();
        format!("{}{}", kept, LABEL_ELLIPSIS)
    } else {
        name.to_string()
    }
}

// ********* Aggregations **********

/// Counts the change points per year and region.
///
/// All the (year, region) pairs present in the records are reported, including the
/// ones without any change point. The output is sorted by year, then by region.
pub fn yearly_change_totals<'a, I>(records: I) -> Vec<RegionYearTotal>
where
    I: IntoIterator<Item = &'a GroupYearRecord>,
{
    let mut tally: BTreeMap<(i32, String), u64> = BTreeMap::new();
    for r in records {
        let c = tally.entry((r.year, r.region.clone())).or_insert(0);
        if r.delta_flag {
            *c += 1;
        }
    }
    debug!("yearly_change_totals: {} (year, region) pairs", tally.len());
    tally
        .into_iter()
        .map(|((year, region), count)| RegionYearTotal {
            year,
            region,
            count,
        })
        .collect()
}

/// Counts the change points of each group over all the years.
///
/// Groups without any change point are reported with a count of zero. The result is
/// sorted by decreasing count; groups with the same count keep the order in which
/// they first appear in the records.
pub fn group_change_totals<'a, I>(records: I) -> Vec<GroupChangeTotal>
where
    I: IntoIterator<Item = &'a GroupYearRecord>,
{
    type GroupKey = (u32, String, String);
    let mut order: Vec<GroupKey> = Vec::new();
    let mut tally: HashMap<GroupKey, u64> = HashMap::new();
    for r in records {
        let key: GroupKey = (r.group_id, r.group_name.clone(), r.region.clone());
        if !tally.contains_key(&key) {
            order.push(key.clone());
        }
        let c = tally.entry(key).or_insert(0);
        if r.delta_flag {
            *c += 1;
        }
    }

    // One entry per (id, name, region): repeated rows of a group are already merged.
    let mut res: Vec<GroupChangeTotal> = order
        .into_iter()
        .map(|key| {
            let count = tally.get(&key).cloned().unwrap_or(0);
            let (group_id, group_name, region) = key;
            GroupChangeTotal {
                group_id,
                label: truncate_label(&group_name),
                group_name,
                region,
                count,
            }
        })
        .collect();
    debug!("group_change_totals: {} groups", res.len());
    // Stable sort: ties stay in insertion order.
    res.sort_by(|a, b| b.count.cmp(&a.count));
    res
}

/// Finds the group-years where the change flag does not match a sign crossing of
/// the framing score.
///
/// A sign crossing happens when the score of the previous available year and the
/// score of the current year are strictly on opposite sides of zero. The first year
/// of a group never crosses.
pub fn change_divergences(records: &[GroupYearRecord]) -> Vec<ChangeDivergence> {
    let mut order: Vec<u32> = Vec::new();
    let mut by_group: HashMap<u32, Vec<&GroupYearRecord>> = HashMap::new();
    for r in records.iter() {
        by_group
            .entry(r.group_id)
            .or_insert_with(|| {
                order.push(r.group_id);
                Vec::new()
            })
            .push(r);
    }

    let mut res: Vec<ChangeDivergence> = Vec::new();
    for gid in order {
        let mut rows = by_group.remove(&gid).unwrap_or_default();
        rows.sort_by_key(|r| r.year);
        let mut previous: Option<f64> = None;
        for r in rows {
            let sign_crossed = match previous {
                Some(p) => (p < 0.0 && r.frame_score > 0.0) || (p > 0.0 && r.frame_score < 0.0),
                None => false,
            };
            if sign_crossed != r.delta_flag {
                res.push(ChangeDivergence {
                    group_id: r.group_id,
                    group_name: r.group_name.clone(),
                    year: r.year,
                    delta_flag: r.delta_flag,
                    sign_crossed,
                });
            }
            previous = Some(r.frame_score);
        }
    }
    res
}

/// Returns the (group id, year) pairs that appear more than once.
pub fn duplicate_group_years(records: &[GroupYearRecord]) -> Vec<(u32, i32)> {
    let mut seen: HashSet<(u32, i32)> = HashSet::new();
    let mut dups: Vec<(u32, i32)> = Vec::new();
    for r in records.iter() {
        let k = (r.group_id, r.year);
        if !seen.insert(k) && !dups.contains(&k) {
            dups.push(k);
        }
    }
    dups
}

// ********* Queries **********

/// The base table, loaded once and never modified afterwards.
///
/// All the queries of the dashboards are answered from this context. A query that
/// matches nothing returns an empty result.
#[derive(PartialEq, Debug, Clone)]
pub struct DataContext {
    records: Vec<GroupYearRecord>,
}

impl DataContext {
    pub fn new(records: Vec<GroupYearRecord>) -> DataContext {
        for (gid, year) in duplicate_group_years(&records) {
            warn!(
                "DataContext: group {} has several rows for year {}, only the first one is plotted",
                gid, year
            );
        }
        info!("DataContext: {} records", records.len());
        DataContext { records }
    }

    /// Builds the context after renaming the records with the remap table.
    pub fn resolved(records: &[GroupYearRecord], remap: &IdentityRemap) -> DataContext {
        DataContext::new(resolve_identities(records, remap))
    }

    pub fn records(&self) -> &[GroupYearRecord] {
        &self.records
    }

    /// The distinct regions, in order of first appearance.
    pub fn regions(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    /// The distinct group names of a region, in order of first appearance.
    pub fn groups_in_region(&self, region: &str) -> Vec<&str> {
        distinct(self.region_rows(region).map(|r| r.group_name.as_str()))
    }

    /// The framing scores of one group, sorted by year.
    ///
    /// If a year appears several times, only the first row is kept.
    pub fn series_for(&self, region: &str, group: &str) -> Vec<SeriesPoint> {
        let mut rows: Vec<&GroupYearRecord> = self
            .region_rows(region)
            .filter(|r| r.group_name == group)
            .collect();
        rows.sort_by_key(|r| r.year);
        rows.dedup_by_key(|r| r.year);
        debug!(
            "series_for: region {:?} group {:?}: {} points",
            region,
            group,
            rows.len()
        );
        rows.iter()
            .map(|r| SeriesPoint {
                year: r.year,
                value: r.frame_score,
            })
            .collect()
    }

    pub fn change_totals_in_region(&self, region: &str) -> Vec<GroupChangeTotal> {
        group_change_totals(self.region_rows(region))
    }

    pub fn yearly_totals_in_region(&self, region: &str) -> Vec<RegionYearTotal> {
        yearly_change_totals(self.region_rows(region))
    }

    fn region_rows<'a, 'r>(
        &'a self,
        region: &'r str,
    ) -> impl Iterator<Item = &'a GroupYearRecord> + 'r
    where
        'a: 'r,
    {
        self.records.iter().filter(move |r| r.region == region)
    }
}

fn distinct<'a, I: Iterator<Item = &'a str>>(it: I) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    it.filter(|s| seen.insert(*s)).collect()
}
