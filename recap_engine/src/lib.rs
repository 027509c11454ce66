pub mod builder;
mod config;
pub mod manual;
pub mod quick_start;

use log::{debug, info, warn};

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    ops::AddAssign,
};

pub use crate::config::*;

// **** Private structures ****

// Position of an institution in the target list.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct InstitutionId(usize);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct StudentCount(u64);

impl StudentCount {
    const EMPTY: StudentCount = StudentCount(0);
}

impl AddAssign for StudentCount {
    fn add_assign(&mut self, rhs: StudentCount) {
        self.0 += rhs.0;
    }
}

// A record that passed the term and institution filters.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct ScopedRecord<'a> {
    institution: InstitutionId,
    record: &'a Record,
}

// One line of the program catalog.
#[derive(Eq, PartialEq, Debug, Clone)]
struct CatalogEntry<'a> {
    code: &'a str,
    name: &'a str,
    level: &'a str,
}

/// Computes the recap table for the given selection.
///
/// Arguments:
/// * `records` the full raw data. It is not modified.
/// * `selection` the terms and program names to include. An empty term or program
/// selection matches nothing.
/// * `target_institutions` the institutions to compare, in output order. Records from any
/// other institution are ignored, both for the counts and for the totals.
///
/// Returns `Ok(None)` when no record matches the selection.
///
/// The percentage of each cell is computed against the total of the institution over
/// all the programs of the selected terms, not only over the selected programs.
pub fn compute_recap(
    records: &[Record],
    selection: &Selection,
    target_institutions: &[String],
) -> Result<Option<RecapTable>, RecapErrors> {
    info!(
        "compute_recap: processing {:?} records, terms: {:?}, programs: {:?}",
        records.len(),
        selection.terms,
        selection.programs
    );
    let institutions = check_institutions(target_institutions)?;
    let terms: BTreeSet<&str> = selection.terms.iter().map(|s| s.as_str()).collect();
    let programs: HashSet<&str> = selection.programs.iter().map(|s| s.as_str()).collect();

    let scoped: Vec<ScopedRecord> = records
        .iter()
        .filter(|r| terms.contains(r.term_id.as_str()))
        .filter_map(|r| {
            institutions
                .get(r.institution_name.as_str())
                .map(|iid| ScopedRecord {
                    institution: *iid,
                    record: r,
                })
        })
        .collect();
    debug!("compute_recap: scoped records: {:?}", scoped.len());

    // The totals are computed before the program filter is applied.
    let totals = institution_totals(&scoped);
    debug!("compute_recap: totals: {:?}", totals);

    let filtered: Vec<ScopedRecord> = scoped
        .iter()
        .filter(|sr| programs.contains(sr.record.program_name.as_str()))
        .cloned()
        .collect();
    if filtered.is_empty() {
        info!("compute_recap: no record matches the selection");
        return Ok(None);
    }
    debug!("compute_recap: program-filtered records: {:?}", filtered.len());

    let (catalog, ambiguities) = build_catalog(records, &programs);
    let counts = aggregate_counts(&filtered);

    let rows: Vec<RecapRow> = catalog
        .iter()
        .map(|entry| RecapRow {
            code: entry.code.to_string(),
            program_name: entry.name.to_string(),
            degree_level: entry.level.to_string(),
            cells: target_institutions
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let iid = InstitutionId(idx);
                    let count = counts
                        .get(&(iid, entry.code))
                        .cloned()
                        .unwrap_or(StudentCount::EMPTY);
                    let total = totals.get(&iid).cloned().unwrap_or(StudentCount::EMPTY);
                    InstitutionCell {
                        institution: name.clone(),
                        count: count.0,
                        percent: percentage(count, total),
                    }
                })
                .collect(),
        })
        .collect();

    let totals_out: Vec<(String, u64)> = target_institutions
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let total = totals
                .get(&InstitutionId(idx))
                .cloned()
                .unwrap_or(StudentCount::EMPTY);
            (name.clone(), total.0)
        })
        .collect();

    for (name, total) in totals_out.iter() {
        info!("Institution total: {:>8} {}", total, name);
    }
    info!("compute_recap: {:?} rows", rows.len());

    Ok(Some(RecapTable {
        institutions: target_institutions.to_vec(),
        terms: terms.iter().map(|s| s.to_string()).collect(),
        rows,
        totals: totals_out,
        ambiguities,
    }))
}

/// The long-form data for a bar chart comparing the institutions for each program.
///
/// There is one point per row and institution, in the order of the table.
pub fn chart_points(table: &RecapTable) -> Vec<ChartPoint> {
    table
        .rows
        .iter()
        .flat_map(|row| {
            row.cells.iter().map(move |cell| ChartPoint {
                code: row.code.clone(),
                program_name: row.program_name.clone(),
                institution: cell.institution.clone(),
                count: cell.count,
            })
        })
        .collect()
}

/// The distinct terms found in the data, most recent first.
pub fn available_terms(records: &[Record]) -> Vec<TermId> {
    let terms: BTreeSet<&str> = records.iter().map(|r| r.term_id.as_str()).collect();
    terms.iter().rev().map(|s| s.to_string()).collect()
}

/// The distinct program names found in the data, in alphabetical order.
pub fn available_programs(records: &[Record]) -> Vec<String> {
    let programs: BTreeSet<&str> = records.iter().map(|r| r.program_name.as_str()).collect();
    programs.iter().map(|s| s.to_string()).collect()
}

fn check_institutions(
    target_institutions: &[String],
) -> Result<HashMap<&str, InstitutionId>, RecapErrors> {
    if target_institutions.is_empty() {
        return Err(RecapErrors::NoTargetInstitutions);
    }
    let mut res: HashMap<&str, InstitutionId> = HashMap::new();
    for (idx, name) in target_institutions.iter().enumerate() {
        if res.insert(name.as_str(), InstitutionId(idx)).is_some() {
            return Err(RecapErrors::DuplicateInstitution(name.clone()));
        }
    }
    Ok(res)
}

fn institution_totals(scoped: &[ScopedRecord]) -> HashMap<InstitutionId, StudentCount> {
    let mut res: HashMap<InstitutionId, StudentCount> = HashMap::new();
    for sr in scoped.iter() {
        *res.entry(sr.institution).or_insert(StudentCount::EMPTY) +=
            StudentCount(sr.record.student_count);
    }
    res
}

fn aggregate_counts<'a>(
    filtered: &[ScopedRecord<'a>],
) -> HashMap<(InstitutionId, &'a str), StudentCount> {
    let mut res: HashMap<(InstitutionId, &'a str), StudentCount> = HashMap::new();
    for sr in filtered.iter() {
        *res.entry((sr.institution, sr.record.program_code.as_str()))
            .or_insert(StudentCount::EMPTY) += StudentCount(sr.record.student_count);
    }
    res
}

// The catalog is built from all the records, not only the scoped ones, so that every
// selected program gets a row even if no target institution offers it in the selected terms.
// Entries are sorted by code. For a code with several (name, level) pairs, the first
// selected pair in record order is kept and the conflict is reported.
fn build_catalog<'a>(
    records: &'a [Record],
    programs: &HashSet<&str>,
) -> (Vec<CatalogEntry<'a>>, Vec<CatalogAmbiguity>) {
    let mut entries: Vec<CatalogEntry<'a>> = Vec::new();
    let mut taken_codes: HashSet<&'a str> = HashSet::new();
    let mut variants: HashMap<&'a str, Vec<(&'a str, &'a str)>> = HashMap::new();

    for r in records.iter() {
        let code = r.program_code.as_str();
        let pair = (r.program_name.as_str(), r.degree_level.as_str());
        let code_variants = variants.entry(code).or_default();
        if !code_variants.contains(&pair) {
            code_variants.push(pair);
        }
        if programs.contains(pair.0) && taken_codes.insert(code) {
            entries.push(CatalogEntry {
                code,
                name: pair.0,
                level: pair.1,
            });
        }
    }
    // Stable: ties keep the order of appearance.
    entries.sort_by(|a, b| a.code.cmp(b.code));

    let mut ambiguities: Vec<CatalogAmbiguity> = variants
        .iter()
        .filter(|(_, pairs)| pairs.len() > 1 && pairs.iter().any(|p| programs.contains(p.0)))
        .map(|(code, pairs)| CatalogAmbiguity {
            code: code.to_string(),
            variants: pairs
                .iter()
                .map(|(name, level)| (name.to_string(), level.to_string()))
                .collect(),
        })
        .collect();
    ambiguities.sort_by(|a, b| a.code.cmp(&b.code));
    for amb in ambiguities.iter() {
        warn!(
            "Program code {} maps to several programs: {:?}",
            amb.code, amb.variants
        );
    }

    (entries, ambiguities)
}

fn percentage(count: StudentCount, total: StudentCount) -> f64 {
    if total == StudentCount::EMPTY {
        return 0.0;
    }
    let raw = count.0 as f64 / total.0 as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rec(term: &str, inst: &str, code: &str, name: &str, count: u64) -> Record {
        Record {
            term_id: term.to_string(),
            institution_name: inst.to_string(),
            program_code: code.to_string(),
            program_name: name.to_string(),
            degree_level: "S1".to_string(),
            student_count: count,
        }
    }

    fn strings(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    const UC: &str = "Universitas Ciputra Surabaya";
    const PETRA: &str = "Universitas Kristen Petra";
    const UBAYA: &str = "Universitas Surabaya";

    fn sample() -> Vec<Record> {
        vec![
            rec("20231", UC, "01", "A", 30),
            rec("20231", UC, "02", "B", 70),
            rec("20231", PETRA, "01", "A", 10),
            rec("20231", PETRA, "03", "C", 30),
            rec("20232", UC, "01", "A", 20),
            rec("20232", PETRA, "02", "B", 60),
            rec("20231", "Universitas Airlangga", "01", "A", 500),
        ]
    }

    fn run(records: &[Record], terms: &[&str], programs: &[&str]) -> Option<RecapTable> {
        compute_recap(
            records,
            &Selection::new(&strings(terms), &strings(programs)),
            &default_target_institutions(),
        )
        .unwrap()
    }

    fn cell<'a>(table: &'a RecapTable, code: &str, inst: &str) -> &'a InstitutionCell {
        table
            .rows
            .iter()
            .find(|r| r.code == code)
            .unwrap()
            .cells
            .iter()
            .find(|c| c.institution == inst)
            .unwrap()
    }

    #[test]
    fn single_program_uses_full_denominator() {
        init();
        let records = vec![
            rec("20231", UC, "01", "A", 30),
            rec("20231", UC, "02", "B", 70),
        ];
        let table = run(&records, &["20231"], &["A"]).unwrap();
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.code, "01");
        assert_eq!(row.cells.len(), 5);
        assert_eq!(row.cells[0].institution, UC);
        assert_eq!(row.cells[0].count, 30);
        assert_eq!(row.cells[0].percent, 30.0);
        assert_eq!(table.total_for(UC), Some(100));
    }

    #[test]
    fn no_matching_term_is_empty() {
        init();
        assert_eq!(run(&sample(), &["20241"], &["A", "B"]), None);
    }

    #[test]
    fn no_matching_program_is_empty() {
        init();
        assert_eq!(run(&sample(), &["20231"], &["Z"]), None);
    }

    #[test]
    fn empty_selection_is_empty() {
        init();
        assert_eq!(run(&sample(), &[], &["A"]), None);
        assert_eq!(run(&sample(), &["20231"], &[]), None);
    }

    #[test]
    fn multiple_terms_are_summed() {
        init();
        let table = run(&sample(), &["20231", "20232"], &["A"]).unwrap();
        assert_eq!(table.terms, strings(&["20231", "20232"]));
        // UC: A = 30 + 20, total = 30 + 70 + 20
        assert_eq!(table.total_for(UC), Some(120));
        let c = cell(&table, "01", UC);
        assert_eq!(c.count, 50);
        assert_eq!(c.percent, 41.67);
        // Petra: A = 10, total = 10 + 30 + 60
        let c = cell(&table, "01", PETRA);
        assert_eq!(c.count, 10);
        assert_eq!(c.percent, 10.0);
    }

    #[test]
    fn institutions_outside_targets_are_ignored() {
        init();
        let table = run(&sample(), &["20231"], &["A"]).unwrap();
        assert!(table
            .rows
            .iter()
            .all(|r| r.cells.iter().all(|c| c.institution != "Universitas Airlangga")));
        assert_eq!(table.total_for("Universitas Airlangga"), None);
        assert_eq!(cell(&table, "01", UC).count, 30);
        let all_counts: u64 = table.rows.iter().flat_map(|r| r.cells.iter()).map(|c| c.count).sum();
        assert_eq!(all_counts, 40);
    }

    #[test]
    fn totals_do_not_depend_on_programs() {
        init();
        let small = run(&sample(), &["20231", "20232"], &["A"]).unwrap();
        let large = run(&sample(), &["20231", "20232"], &["A", "B", "C"]).unwrap();
        assert_eq!(small.totals, large.totals);
    }

    #[test]
    fn selected_programs_without_enrollment_get_a_row() {
        init();
        // C is only offered by Petra, and only in 20231.
        let table = run(&sample(), &["20232"], &["A", "C"]).unwrap();
        let codes: Vec<&str> = table.rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["01", "03"]);
        let c = cell(&table, "03", PETRA);
        assert_eq!(c.count, 0);
        assert_eq!(c.percent, 0.0);
    }

    #[test]
    fn missing_institutions_are_zero_filled() {
        init();
        let table = run(&sample(), &["20231"], &["A"]).unwrap();
        let c = cell(&table, "01", UBAYA);
        assert_eq!(c.count, 0);
        assert_eq!(c.percent, 0.0);
        assert_eq!(table.total_for(UBAYA), Some(0));
    }

    #[test]
    fn duplicate_rows_are_summed() {
        init();
        let records = vec![
            rec("20231", UC, "01", "A", 10),
            rec("20231", UC, "01", "A", 15),
            rec("20231", UC, "02", "B", 25),
        ];
        let table = run(&records, &["20231"], &["A"]).unwrap();
        let c = cell(&table, "01", UC);
        assert_eq!(c.count, 25);
        assert_eq!(c.percent, 50.0);
    }

    #[test]
    fn rows_are_sorted_by_code() {
        init();
        let records = vec![
            rec("20231", UC, "05", "E", 1),
            rec("20231", UC, "01", "A", 1),
            rec("20231", UC, "03", "C", 1),
        ];
        let table = run(&records, &["20231"], &["C", "E", "A"]).unwrap();
        let codes: Vec<&str> = table.rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["01", "03", "05"]);
    }

    #[test]
    fn shares_add_up_to_the_selected_fraction() {
        init();
        let table = run(&sample(), &["20231", "20232"], &["A", "B"]).unwrap();
        for (idx, inst) in table.institutions.iter().enumerate() {
            let total = table.total_for(inst).unwrap();
            if total == 0 {
                continue;
            }
            let count_sum: u64 = table.rows.iter().map(|r| r.cells[idx].count).sum();
            let percent_sum: f64 = table.rows.iter().map(|r| r.cells[idx].percent).sum();
            let expected = count_sum as f64 / total as f64;
            assert!((percent_sum / 100.0 - expected).abs() < 0.0001 * table.rows.len() as f64);
        }
    }

    #[test]
    fn same_inputs_same_outputs() {
        init();
        let a = run(&sample(), &["20231", "20232"], &["A", "B", "C"]);
        let b = run(&sample(), &["20231", "20232"], &["A", "B", "C"]);
        assert_eq!(a, b);
    }

    #[test]
    fn percent_is_not_clamped() {
        assert_eq!(percentage(StudentCount(3), StudentCount(2)), 150.0);
        assert_eq!(percentage(StudentCount(1), StudentCount(3)), 33.33);
        assert_eq!(percentage(StudentCount(2), StudentCount(3)), 66.67);
        assert_eq!(percentage(StudentCount(5), StudentCount::EMPTY), 0.0);
    }

    #[test]
    fn ambiguous_codes_are_reported() {
        init();
        let mut records = sample();
        let mut other = rec("20231", UBAYA, "01", "A prime", 5);
        other.degree_level = "D3".to_string();
        records.push(other);
        let table = run(&records, &["20231"], &["A"]).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].program_name, "A");
        assert_eq!(
            table.ambiguities,
            vec![CatalogAmbiguity {
                code: "01".to_string(),
                variants: vec![
                    ("A".to_string(), "S1".to_string()),
                    ("A prime".to_string(), "D3".to_string())
                ],
            }]
        );
        // The record under the other name is not counted for the selected program.
        assert_eq!(cell(&table, "01", UBAYA).count, 0);
        assert_eq!(table.total_for(UBAYA), Some(5));
    }

    #[test]
    fn target_list_is_validated() {
        let sel = Selection::new(&strings(&["20231"]), &strings(&["A"]));
        assert_eq!(
            compute_recap(&sample(), &sel, &[]),
            Err(RecapErrors::NoTargetInstitutions)
        );
        assert_eq!(
            compute_recap(&sample(), &sel, &strings(&[UC, PETRA, UC])),
            Err(RecapErrors::DuplicateInstitution(UC.to_string()))
        );
    }

    #[test]
    fn custom_target_order_is_kept() {
        init();
        let sel = Selection::new(&strings(&["20231"]), &strings(&["A"]));
        let table = compute_recap(&sample(), &sel, &strings(&[PETRA, UC]))
            .unwrap()
            .unwrap();
        let names: Vec<&str> = table.rows[0]
            .cells
            .iter()
            .map(|c| c.institution.as_str())
            .collect();
        assert_eq!(names, vec![PETRA, UC]);
        assert_eq!(table.totals, vec![(PETRA.to_string(), 40), (UC.to_string(), 100)]);
    }

    #[test]
    fn chart_points_follow_the_table() {
        init();
        let table = run(&sample(), &["20231"], &["A", "B"]).unwrap();
        let points = chart_points(&table);
        assert_eq!(points.len(), 2 * 5);
        assert_eq!(
            points[0],
            ChartPoint {
                code: "01".to_string(),
                program_name: "A".to_string(),
                institution: UC.to_string(),
                count: 30,
            }
        );
        assert_eq!(points[5].code, "02");
    }

    #[test]
    fn selection_options() {
        assert_eq!(available_terms(&sample()), strings(&["20232", "20231"]));
        assert_eq!(available_programs(&sample()), strings(&["A", "B", "C"]));
    }
}
