use crate::types::{CsrRecord, Dashboard, Kpis, SectorSpend, StateSpend, YearSpend};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Which year labels of the selected company to include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearFilter {
    /// Every year present for the company.
    All,
    /// Only these labels. An empty set selects nothing.
    Only(BTreeSet<String>),
}

impl YearFilter {
    fn accepts(&self, year: &str) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Only(years) => years.contains(year),
        }
    }
}

/// Company names present in the corpus, sorted.
pub fn companies(corpus: &[CsrRecord]) -> Vec<String> {
    let names: BTreeSet<&str> = corpus.iter().map(|r| r.company.as_str()).collect();
    names.into_iter().map(str::to_string).collect()
}

/// Year labels present for `company`, sorted.
pub fn years_for(corpus: &[CsrRecord], company: &str) -> Vec<String> {
    let years: BTreeSet<&str> = corpus
        .iter()
        .filter(|r| r.company == company)
        .map(|r| r.year.as_str())
        .collect();
    years.into_iter().map(str::to_string).collect()
}

/// Rows of `company` whose year passes `years`, in corpus order.
pub fn filter_records<'a>(
    corpus: &'a [CsrRecord],
    company: &str,
    years: &YearFilter,
) -> Vec<&'a CsrRecord> {
    corpus
        .iter()
        .filter(|r| r.company == company && years.accepts(&r.year))
        .collect()
}

pub fn year_spend(rows: &[&CsrRecord]) -> Vec<YearSpend> {
    let mut by_year: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows {
        *by_year.entry(r.year.as_str()).or_insert(0.0) += r.amount_spent_cr;
    }
    by_year
        .into_iter()
        .map(|(year, amount)| YearSpend {
            year: year.to_string(),
            amount_spent_cr: amount,
        })
        .collect()
}

pub fn sector_spend(rows: &[&CsrRecord]) -> Vec<SectorSpend> {
    let mut sums = sum_by(rows, |r| r.sector.as_str());
    sort_desc(&mut sums);
    sums.into_iter()
        .map(|(sector, amount)| SectorSpend {
            sector: sector.to_string(),
            amount_spent_cr: amount,
        })
        .collect()
}

pub fn state_spend(rows: &[&CsrRecord]) -> Vec<StateSpend> {
    let mut sectors: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for r in rows {
        let entry = sectors.entry(r.state.as_str()).or_default();
        if !r.sector.is_empty() {
            entry.insert(r.sector.as_str());
        }
    }

    let mut sums = sum_by(rows, |r| r.state.as_str());
    sort_desc(&mut sums);
    sums.into_iter()
        .map(|(state, amount)| StateSpend {
            state: state.to_string(),
            amount_spent_cr: amount,
            sectors: sectors
                .get(state)
                .map(|s| s.iter().copied().collect::<Vec<_>>().join(", "))
                .unwrap_or_default(),
        })
        .collect()
}

pub fn kpis(rows: &[&CsrRecord]) -> Kpis {
    let projects: HashSet<&str> = rows
        .iter()
        .map(|r| r.project.as_str())
        .filter(|p| !p.is_empty())
        .collect();
    let states: HashSet<&str> = rows
        .iter()
        .map(|r| r.state.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    Kpis {
        // Float `sum()` of nothing is -0.0.
        total_spent_cr: rows.iter().fold(0.0, |acc, r| acc + r.amount_spent_cr),
        project_count: projects.len(),
        state_count: states.len(),
    }
}

/// Filter the corpus and compute every view for one selection.
///
/// A selection that matches nothing yields an empty dashboard with zeroed
/// KPIs; see [`Dashboard::is_empty`].
pub fn aggregate(corpus: &[CsrRecord], company: &str, years: &YearFilter) -> Dashboard {
    let rows = filter_records(corpus, company, years);
    let by_year = year_spend(&rows);
    Dashboard {
        company: company.to_string(),
        years: by_year.iter().map(|y| y.year.clone()).collect(),
        kpis: kpis(&rows),
        by_sector: sector_spend(&rows),
        by_state: state_spend(&rows),
        by_year,
    }
}

/// Sum amounts per key. Keys keep their first-encounter order.
fn sum_by<'a, F>(rows: &[&'a CsrRecord], key: F) -> Vec<(&'a str, f64)>
where
    F: Fn(&'a CsrRecord) -> &'a str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(&str, f64)> = Vec::new();
    for &r in rows {
        let k = key(r);
        match index.get(k) {
            Some(&i) => sums[i].1 += r.amount_spent_cr,
            None => {
                index.insert(k, sums.len());
                sums.push((k, r.amount_spent_cr));
            }
        }
    }
    sums
}

// Stable, so equal sums stay in first-encounter order.
fn sort_desc(sums: &mut [(&str, f64)]) {
    sums.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
}
