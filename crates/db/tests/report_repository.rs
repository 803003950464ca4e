use db::{pg::PgDatabase, ReportInsert, ReportQuery, Repositories};
use db_test_fixture::DbFixture;

fn report(message: &str, scam: bool, confidence: f64) -> ReportInsert {
    ReportInsert {
        message: message.into(),
        scam,
        confidence,
        ml_score: confidence,
        url_risk: 0,
        keyword_risk: 0,
        urls: Vec::new(),
        reasons: Vec::new(),
        policy_version: "policy_test".into(),
    }
}

#[tokio::test]
async fn insert_then_query_newest_first() -> anyhow::Result<()> {
    let fixture = match DbFixture::from_env() {
        Ok(fixture) => fixture,
        Err(err) => {
            eprintln!("skipping insert_then_query_newest_first: {err}");
            return Ok(());
        }
    };
    let handle = fixture.create("reports_query").await?;
    let database = PgDatabase::connect(handle.database_url()).await?;
    let reports = database.reports();

    let mut first = report("hello there", false, 12.5);
    first.urls = vec!["http://example.org".into()];
    let stored = reports.insert(first.clone()).await?;
    assert_eq!(stored.message, first.message);
    assert_eq!(stored.urls, first.urls);
    reports.insert(report("verify your otp", true, 88.0)).await?;

    let all = reports.query(ReportQuery::default()).await?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].message, "verify your otp");

    let scams = reports
        .query(ReportQuery {
            scam: Some(true),
            ..Default::default()
        })
        .await?;
    assert_eq!(scams.len(), 1);
    assert!(scams[0].scam);

    let limited = reports
        .query(ReportQuery {
            limit: Some(1),
            ..Default::default()
        })
        .await?;
    assert_eq!(limited.len(), 1);

    drop(database);
    handle.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn analytics_counts_verdicts_per_day() -> anyhow::Result<()> {
    let fixture = match DbFixture::from_env() {
        Ok(fixture) => fixture,
        Err(err) => {
            eprintln!("skipping analytics_counts_verdicts_per_day: {err}");
            return Ok(());
        }
    };
    let handle = fixture.create("reports_analytics").await?;
    let database = PgDatabase::connect(handle.database_url()).await?;
    let reports = database.reports();

    let empty = reports.analytics().await?;
    assert_eq!(empty.totals.total, 0);
    assert!(empty.daily.is_empty());

    reports.insert(report("a", true, 90.0)).await?;
    reports.insert(report("b", true, 70.0)).await?;
    reports.insert(report("c", false, 10.0)).await?;

    let analytics = reports.analytics().await?;
    assert_eq!(analytics.totals.total, 3);
    assert_eq!(analytics.totals.scam, 2);
    assert_eq!(analytics.totals.safe, 1);
    assert_eq!(analytics.daily.iter().map(|d| d.count).sum::<i64>(), 3);

    drop(database);
    handle.cleanup().await?;
    Ok(())
}
