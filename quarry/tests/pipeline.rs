mod common;

use common::Fixture;
use quarry::{
    aggregate, AggregateError, Cell, ChartKind, Error, Number, Page, Palette, QueryTemplate,
    ResultSet,
};

#[test]
fn classification_query_reproduces_fixture_groups() {
    let fixture = Fixture::with_cookies(&[("snacks", "Acme", 5), ("drinks", "Globex", 3)]);
    let result = fixture
        .dashboard
        .database()
        .execute(QueryTemplate::ClassificationDistribution)
        .unwrap();
    // GROUP BY hands groups back in key order.
    let expected = ResultSet::new(
        ["classification", "count"],
        vec![
            vec![Cell::from("drinks"), Cell::from(3)],
            vec![Cell::from("snacks"), Cell::from(5)],
        ],
    );
    assert_eq!(result, expected);
}

#[test]
fn vendor_question_end_to_end() {
    let fixture = Fixture::with_cookies(&[("snacks", "Acme", 4), ("drinks", "Globex", 6)]);
    let payload = fixture
        .dashboard
        .answer("Show me vendor distribution")
        .unwrap()
        .expect("a report");
    assert_eq!(payload.chart_kind, ChartKind::Comparison);
    assert_eq!(payload.title, "Distribution by Vendor");
    assert_eq!(
        payload.insights,
        vec![
            "Total number of cookies: 10".to_string(),
            "The category with the highest count is 'Globex' with 6 cookies.".to_string(),
            "The category with the lowest count is 'Acme' with 4 cookies.".to_string(),
        ]
    );
    assert_eq!(payload.table.columns, vec!["vendor", "count"]);
    assert_eq!(payload.table.rows.len(), 2);
}

#[test]
fn unmatched_question_reports_on_classification() {
    let fixture = Fixture::with_cookies(&[("snacks", "Acme", 2), ("drinks", "Acme", 1)]);
    let payload = fixture
        .dashboard
        .answer("what do we have?")
        .unwrap()
        .expect("a report");
    assert_eq!(payload.chart_kind, ChartKind::Proportion);
    assert_eq!(payload.title, "Distribution by Classification");
}

#[test]
fn empty_question_short_circuits() {
    let fixture = Fixture::with_sql("");
    assert!(fixture.dashboard.answer("").unwrap().is_none());
    assert_eq!(fixture.dashboard.page(""), Page::Blank);
}

#[test]
fn query_failures_are_surfaced_not_swallowed() {
    let fixture = Fixture::with_sql("CREATE TABLE biscuits(id INT);");
    let err = fixture.dashboard.answer("vendor").unwrap_err();
    assert!(matches!(err, Error::Query(_)));
    match fixture.dashboard.page("vendor") {
        Page::Failed { question, message } => {
            assert_eq!(question, "vendor");
            assert!(message.contains("no such table"), "message: {}", message);
        }
        other => panic!("expected a failed page, got {:?}", other),
    }
    let html = fixture.dashboard.render_page("vendor").unwrap();
    assert!(html.contains("alert-danger"));
}

#[test]
fn empty_table_is_a_no_data_error() {
    let fixture = Fixture::with_cookies(&[]);
    let err = fixture.dashboard.answer("classification").unwrap_err();
    assert!(matches!(err, Error::Aggregate(AggregateError::NoRows)));
    assert!(err.to_string().contains("no data"));
}

#[test]
fn degraded_empty_results_cannot_be_aggregated() {
    let fixture = Fixture::with_sql("");
    let result = fixture
        .dashboard
        .database()
        .execute_or_empty(QueryTemplate::VendorDistribution);
    assert_eq!(result, ResultSet::empty());
    assert_eq!(
        aggregate(&result, &Palette::default()),
        Err(AggregateError::NoColumns)
    );
}

#[test]
fn insight_totals_follow_the_database() {
    let fixture = Fixture::with_cookies(&[
        ("A", "Acme", 10),
        ("B", "Acme", 2),
        ("C", "Acme", 5),
    ]);
    let result = fixture
        .dashboard
        .database()
        .execute(QueryTemplate::ClassificationDistribution)
        .unwrap();
    let analysis = aggregate(&result, &Palette::default()).unwrap();
    assert_eq!(analysis.insights.total(), Number::Integer(17));
    assert_eq!(analysis.insights.max().label, "A");
    assert_eq!(analysis.insights.min().label, "B");
}
