use super::*;

#[test]
fn test_single_row_layout() {
    let layout = parse_layout("A\tA\tB\tB");
    assert_eq!(layout.n_rows(), 1);
    assert_eq!(layout.n_cols, 4);
    let expected: BTreeMap<u32, String> = [(1, "A"), (2, "A"), (3, "B"), (4, "B")]
        .into_iter()
        .map(|(w, l)| (w, l.to_string()))
        .collect();
    assert_eq!(layout.mapping, expected);
    assert!(layout.is_rectangular());
}

#[test]
fn test_rectangular_grid_is_row_major() {
    let text = "T1\tT1\tT2\tT2\tT5\nT4\tT4\tT3\tT3\tT6\nx\ty\tz\tw\tv";
    let layout = parse_layout(text);
    assert_eq!(layout.n_wells(), 15);
    let wells: Vec<u32> = layout.mapping.keys().copied().collect();
    assert_eq!(wells, (1..=15).collect::<Vec<u32>>());
    assert_eq!(layout.label_for(5), Some("T5"));
    assert_eq!(layout.label_for(6), Some("T4"));
    assert_eq!(layout.label_for(15), Some("v"));
    assert_eq!(layout.label_for(16), None);
}

#[test]
fn test_labels_are_verbatim() {
    let layout = parse_layout("100_FluA\t 10_fluA \tmix");
    assert_eq!(layout.label_for(2), Some(" 10_fluA "));
    assert_eq!(layout.label_for(3), Some("mix"));
}

#[test]
fn test_surrounding_whitespace_and_crlf() {
    let layout = parse_layout("\n100_FluA\t100_FluA\r\n50_FluA\t100_MG\t\n\n");
    assert_eq!(layout.n_rows(), 2);
    assert!(layout.is_rectangular());
    assert_eq!(layout.label_for(4), Some("100_MG"));
}

#[test]
fn test_short_row_leaves_wells_unmapped() {
    let layout = parse_layout("A\tB\tC\nD");
    assert_eq!(layout.label_for(4), Some("D"));
    assert_eq!(layout.label_for(5), None);
    assert_eq!(layout.label_for(6), None);
    assert_eq!(
        layout.issues,
        vec![LayoutIssue {
            row: 2,
            expected: 3,
            found: 1
        }]
    );
    assert!(matches!(validate_layout(&layout), Err(LayoutError::Ragged(_))));
}

#[test]
fn test_long_row_extra_cells_ignored() {
    let layout = parse_layout("A\tB\nC\tD\tE");
    assert_eq!(layout.n_wells(), 4);
    assert_eq!(layout.label_for(4), Some("D"));
    assert_eq!(layout.issues.len(), 1);
}

#[test]
fn test_empty_layout() {
    let layout = parse_layout("   \n ");
    assert_eq!(layout.n_wells(), 0);
    assert!(layout.is_rectangular());
    assert!(matches!(validate_layout(&layout), Err(LayoutError::Empty)));
}

#[test]
fn test_conditions_sorted_distinct() {
    let layout = parse_layout("B\tA\nA\tC");
    let conditions: Vec<&str> = layout.conditions().into_iter().collect();
    assert_eq!(conditions, vec!["A", "B", "C"]);
}

#[test]
fn test_ragged_error_message() {
    let layout = parse_layout("A\tB\nC");
    let err = validate_layout(&layout).unwrap_err();
    assert_eq!(
        err.to_string(),
        "malformed layout: layout row 2 has 1 cells, expected 2"
    );
}
