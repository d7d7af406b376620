use ipo_readiness::*;

/// Builds real `.xlsx` bytes for the standard layout. Cells are addressed
/// the way the statements print them ("J14").
#[derive(Default)]
struct Fixture {
    sheets: Vec<FixtureSheet>,
}

struct FixtureSheet {
    name: String,
    texts: Vec<(String, String)>,
    numbers: Vec<(String, f64)>,
}

impl Fixture {
    fn new() -> Self {
        Self::default()
    }

    /// Starts a sheet whose A1 carries the statement title.
    fn sheet(mut self, name: &str, title: &str) -> Self {
        self.sheets.push(FixtureSheet {
            name: name.to_string(),
            texts: vec![("A1".to_string(), title.to_string())],
            numbers: Vec::new(),
        });
        self
    }

    fn text(mut self, cell: &str, text: &str) -> Self {
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.texts.push((cell.to_string(), text.to_string()));
        }
        self
    }

    fn number(mut self, cell: &str, value: f64) -> Self {
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.numbers.push((cell.to_string(), value));
        }
        self
    }

    fn build(&self) -> anyhow::Result<Vec<u8>> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            for (cell, text) in &sheet.texts {
                let (row, col) = position(cell)?;
                worksheet.write_string(row, col, text)?;
            }
            for (cell, value) in &sheet.numbers {
                let (row, col) = position(cell)?;
                worksheet.write_number(row, col, *value)?;
            }
        }
        Ok(workbook.save_to_buffer()?)
    }

    fn upload(&self, filename: &str) -> anyhow::Result<Upload> {
        Ok(Upload::new(filename, self.build()?))
    }
}

fn position(cell: &str) -> anyhow::Result<(u32, u16)> {
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| anyhow::anyhow!("cell '{}' has no row", cell))?;
    let (letters, digits) = cell.split_at(split);
    let (row, col) = utils::cell_position(digits.parse()?, letters)?;
    Ok((row, u16::try_from(col)?))
}

const INCOME_TITLE: &str = "งบกำไรขาดทุน";
const BALANCE_TITLE: &str = "งบแสดงฐานะการเงิน";
const RATIO_TITLE: &str = "อัตราส่วนทางการเงินที่สำคัญ";

/// Standard income/balance column of a fiscal year (2563..=2567).
fn statement_col(year: i32) -> &'static str {
    ["B", "D", "F", "H", "J"][(year - 2563) as usize]
}

/// Standard ratio column of a fiscal year (2563..=2567).
fn ratio_col(year: i32) -> &'static str {
    ["B", "C", "D", "E", "F"][(year - 2563) as usize]
}

fn cell(col: &str, row: u32) -> String {
    format!("{}{}", col, row)
}

/// Income sheet with net profit per year (row 14), balance sheet with
/// latest equity (row 15).
fn statements(profits: &[(i32, f64)], equity: f64) -> Fixture {
    let mut fixture = Fixture::new().sheet("Income", INCOME_TITLE);
    for (year, profit) in profits {
        fixture = fixture.number(&cell(statement_col(*year), 14), *profit);
    }
    fixture
        .sheet("Balance", BALANCE_TITLE)
        .number(&cell(statement_col(2567), 15), equity)
}

#[test]
fn test_scenario_mai_ready_with_two_year_record() -> anyhow::Result<()> {
    let upload = statements(&[(2566, 80_000_000.0), (2567, 90_000_000.0)], 900_000_000.0)
        .upload("financials.xlsx")?;

    let analysis = analyze_uploads(&[upload])?;
    let result = &analysis.assessment;

    let set_failures: Vec<CheckKind> = result
        .set_assessment
        .checks
        .iter()
        .filter(|c| !c.passed)
        .map(|c| c.kind)
        .collect();
    assert_eq!(set_failures, vec![CheckKind::TrackRecord]);
    assert!(result.mai_assessment.passed);
    assert_eq!(result.readiness_level, ReadinessLevel::MaiReady);
    assert_eq!(result.readiness_score, 75);
    assert_eq!(result.key_figures.unit_multiplier, 1.0);

    let summary = ProjectSummary::from_assessment(result);
    assert_eq!(summary.next_milestone, "พร้อมยื่น mai");
    assert_eq!(summary.phase, ProjectPhase::FilingPrep);
    Ok(())
}

#[test]
fn test_figures_in_millions_are_scaled() -> anyhow::Result<()> {
    let upload = statements(&[(2566, 80.0), (2567, 90.0)], 900.0).upload("millions.xlsx")?;

    let result = analyze_uploads(&[upload])?.assessment;

    assert_eq!(result.key_figures.unit_multiplier, 1_000_000.0);
    assert_eq!(result.key_figures.latest_profit, 90_000_000.0);
    assert_eq!(result.key_figures.shareholders_equity, 900_000_000.0);
    assert_eq!(result.readiness_level, ReadinessLevel::MaiReady);
    Ok(())
}

#[test]
fn test_scenario_no_monetary_data() -> anyhow::Result<()> {
    let upload = Fixture::new()
        .sheet("Notes", "หมายเหตุประกอบงบการเงิน")
        .text("A3", "ไม่มีตัวเลข")
        .upload("notes.xlsx")?;

    let analysis = analyze_uploads(&[upload])?;
    let result = &analysis.assessment;

    assert!(analysis.dataset.ratios.is_empty());
    assert!(analysis.dataset.income_statement.is_empty());
    assert!(analysis.dataset.balance_sheet.is_empty());
    assert_eq!(result.key_figures.unit_multiplier, 1.0);
    for market in [&result.set_assessment, &result.mai_assessment] {
        assert_eq!(market.pass_count, 0);
        for check in &market.checks {
            assert!(!check.passed);
            assert_eq!(check.gap, check.required);
        }
    }
    assert_eq!(result.financial_health.percentage, 0.0);
    assert_eq!(result.readiness_level, ReadinessLevel::NeedsDevelopment);
    assert_eq!(result.readiness_score, 25);
    Ok(())
}

#[test]
fn test_set_and_mai_both_pass_gives_set_tier() -> anyhow::Result<()> {
    let upload = statements(
        &[(2565, 60_000_000.0), (2566, 80_000_000.0), (2567, 90_000_000.0)],
        900_000_000.0,
    )
    .upload("set.xlsx")?;

    let result = analyze_uploads(&[upload])?.assessment;

    assert!(result.is_set_eligible() && result.is_mai_eligible());
    assert_eq!(result.readiness_level, ReadinessLevel::SetReady);
    assert_eq!(result.readiness_score, 100);
    assert_eq!(result.key_figures.cumulative_profit, 230_000_000.0);
    Ok(())
}

#[test]
fn test_equity_gap_is_reported_in_millions() -> anyhow::Result<()> {
    let upload = statements(&[(2566, 30_000_000.0), (2567, 30_000_000.0)], 60_000_000.0)
        .upload("gap.xlsx")?;

    let result = analyze_uploads(&[upload])?.assessment;

    let equity = result
        .mai_assessment
        .check(CheckKind::Equity)
        .ok_or_else(|| anyhow::anyhow!("missing equity check"))?;
    assert_eq!(equity.gap, 40_000_000.0);
    assert_eq!(format_thb(equity.gap), "40.00 ล้านบาท");

    assert_eq!(result.readiness_level, ReadinessLevel::NearlyReady);
    assert_eq!(result.recommendations.len(), 1);
    assert!(result.recommendations[0].message.contains("40.00 ล้านบาท"));

    let summary = ProjectSummary::from_assessment(&result);
    assert_eq!(summary.phase, ProjectPhase::PreAudit);
    assert_eq!(summary.next_milestone, result.recommendations[0].message);
    Ok(())
}

#[test]
fn test_repeated_analysis_is_byte_identical() -> anyhow::Result<()> {
    let fixture = statements(&[(2565, 12.0), (2566, 18.5), (2567, 21.25)], 140.0)
        .sheet("Ratios", RATIO_TITLE)
        .number(&cell(ratio_col(2567), 12), 1.4)
        .number(&cell(ratio_col(2567), 22), 0.9);
    let uploads = vec![fixture.upload("a.xlsx")?, fixture.upload("b.xlsx")?];

    let first = analyze_uploads(&uploads)?.assessment.to_json()?;
    let second = analyze_uploads(&uploads)?.assessment.to_json()?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_later_file_wins_for_shared_year() -> anyhow::Result<()> {
    let first = Fixture::new()
        .sheet("Income", INCOME_TITLE)
        .number(&cell(statement_col(2566), 14), 5.0)
        .number(&cell(statement_col(2567), 14), 10.0)
        .upload("2566.xlsx")?;
    let second = Fixture::new()
        .sheet("Income", INCOME_TITLE)
        .number(&cell(statement_col(2567), 14), 20.0)
        .upload("2567.xlsx")?;

    let analysis = analyze_uploads(&[first, second])?;

    let net_profit = analysis
        .dataset
        .series(StatementKind::Income, line_items::NET_PROFIT)
        .ok_or_else(|| anyhow::anyhow!("net profit missing"))?;
    assert_eq!(net_profit.get(&2566), Some(&5.0));
    assert_eq!(net_profit.get(&2567), Some(&20.0));
    Ok(())
}

#[test]
fn test_gross_profit_derived_across_files() -> anyhow::Result<()> {
    let income = Fixture::new()
        .sheet("Income", INCOME_TITLE)
        .number(&cell(statement_col(2567), 7), 1_000.0)
        .upload("income.xlsx")?;
    let ratios = Fixture::new()
        .sheet("Ratios", RATIO_TITLE)
        .number(&cell(ratio_col(2567), 9), 30.0)
        .upload("ratios.xlsx")?;

    let analysis = analyze_uploads(&[income, ratios])?;

    let gross = analysis
        .dataset
        .series(StatementKind::Income, line_items::GROSS_PROFIT)
        .ok_or_else(|| anyhow::anyhow!("gross profit not derived"))?;
    assert_eq!(gross.get(&2567), Some(&300.0));
    let margin = analysis.assessment.metrics.gross_margin[&2567];
    assert!((margin - 30.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_existing_gross_profit_is_kept() -> anyhow::Result<()> {
    let upload = Fixture::new()
        .sheet("Income", INCOME_TITLE)
        .number(&cell(statement_col(2567), 7), 1_000.0)
        .number(&cell(statement_col(2567), 9), 111.0)
        .sheet("Ratios", RATIO_TITLE)
        .number(&cell(ratio_col(2567), 9), 30.0)
        .upload("both.xlsx")?;

    let analysis = analyze_uploads(&[upload])?;

    let gross = analysis
        .dataset
        .series(StatementKind::Income, line_items::GROSS_PROFIT)
        .ok_or_else(|| anyhow::anyhow!("gross profit missing"))?;
    assert_eq!(gross.get(&2567), Some(&111.0));
    Ok(())
}

#[test]
fn test_total_liabilities_derived_when_absent() -> anyhow::Result<()> {
    let upload = Fixture::new()
        .sheet("Balance", BALANCE_TITLE)
        .number(&cell(statement_col(2567), 11), 1_000.0)
        .number(&cell(statement_col(2567), 15), 400.0)
        .upload("balance.xlsx")?;

    let analysis = analyze_uploads(&[upload])?;

    let liabilities = analysis
        .dataset
        .series(StatementKind::Balance, line_items::TOTAL_LIABILITIES)
        .ok_or_else(|| anyhow::anyhow!("liabilities not derived"))?;
    assert_eq!(liabilities.get(&2567), Some(&600.0));
    assert_eq!(analysis.assessment.metrics.debt_to_assets.get(&2567), Some(&0.6));
    Ok(())
}

/// Binary BIFF8 workbook with two sheets in the legacy layout. Income: revenue
/// in I6/K6, net profit in G12/I12/K12, company name in C1. Balance: assets in
/// I9/K9, equity in I13/K13.
const LEGACY_XLS: &[u8] = include_bytes!("fixtures/legacy_statements.xls");

#[test]
fn test_legacy_xls_uses_shifted_layout() -> anyhow::Result<()> {
    let analysis = analyze_uploads(&[Upload::new("legacy.xls", LEGACY_XLS.to_vec())])?;
    let dataset = &analysis.dataset;

    let series = |kind, key| dataset.series_or_empty(kind, key);
    assert_eq!(
        series(StatementKind::Income, line_items::TOTAL_REVENUE),
        FiscalSeries::from([(2566, 1_200.0), (2567, 1_500.0)])
    );
    assert_eq!(
        series(StatementKind::Income, line_items::NET_PROFIT),
        FiscalSeries::from([(2565, 90.0), (2566, 110.0), (2567, 130.0)])
    );
    assert_eq!(
        series(StatementKind::Balance, line_items::TOTAL_ASSETS),
        FiscalSeries::from([(2566, 1_400.0), (2567, 1_500.0)])
    );
    assert_eq!(
        series(StatementKind::Balance, line_items::SHAREHOLDERS_EQUITY),
        FiscalSeries::from([(2566, 550.0), (2567, 600.0)])
    );
    assert_eq!(
        series(StatementKind::Balance, line_items::TOTAL_LIABILITIES),
        FiscalSeries::from([(2566, 850.0), (2567, 900.0)])
    );
    assert!(dataset.ratios.is_empty());
    assert_eq!(dataset.company_name.as_deref(), Some("บริษัท เลกาซี จำกัด"));
    Ok(())
}

#[test]
fn test_company_name_from_first_file_wins() -> anyhow::Result<()> {
    let first = Fixture::new()
        .sheet("Ratios", RATIO_TITLE)
        .text("C1", "บริษัท แรก จำกัด")
        .upload("first.xlsx")?;
    let second = Fixture::new()
        .sheet("Ratios", RATIO_TITLE)
        .text("C1", "บริษัท ที่สอง จำกัด")
        .upload("second.xlsx")?;

    let analysis = analyze_uploads(&[first, second])?;

    assert_eq!(analysis.dataset.company_name.as_deref(), Some("บริษัท แรก จำกัด"));
    Ok(())
}

#[test]
fn test_company_name_from_ratio_sheet() -> anyhow::Result<()> {
    let upload = statements(&[(2567, 10.0)], 50.0)
        .sheet("Ratios", RATIO_TITLE)
        .text("C1", "บริษัท สยามเทค จำกัด")
        .upload("named.xlsx")?;

    let analysis = analyze_uploads(&[upload])?;

    assert_eq!(
        analysis.dataset.company_name.as_deref(),
        Some("บริษัท สยามเทค จำกัด")
    );
    assert_eq!(
        analysis.assessment.company_name.as_deref(),
        Some("บริษัท สยามเทค จำกัด")
    );
    Ok(())
}

#[test]
fn test_no_uploads() {
    assert!(matches!(analyze_uploads(&[]), Err(IpoReadinessError::NoInput)));
}

#[test]
fn test_unreadable_upload_is_a_parse_error() {
    for filename in ["broken.xlsx", "broken.xls"] {
        let upload = Upload::new(filename, b"definitely not a workbook".to_vec());
        match analyze_uploads(&[upload]) {
            Err(IpoReadinessError::ParseError { filename: name, .. }) => assert_eq!(name, filename),
            other => panic!("expected parse error for {}, got {:?}", filename, other),
        }
    }
}

#[test]
fn test_oversized_upload_rejected() -> anyhow::Result<()> {
    let config = AnalyzerConfig {
        max_upload_bytes: 64,
        ..AnalyzerConfig::default()
    };
    let analyzer = IpoReadinessAnalyzer::new(config)?;
    let upload = statements(&[(2567, 10.0)], 50.0).upload("big.xlsx")?;

    assert!(matches!(
        analyzer.analyze(&[upload]),
        Err(IpoReadinessError::UploadTooLarge { limit: 64, .. })
    ));
    Ok(())
}

#[test]
fn test_upload_from_reader() -> anyhow::Result<()> {
    let bytes = statements(&[(2567, 10.0)], 50.0).build()?;
    let upload = Upload::from_reader("reader.xlsx", std::io::Cursor::new(bytes.clone()))?;
    assert_eq!(upload.bytes, bytes);
    Ok(())
}

#[test]
fn test_assessment_persisted_through_store() -> anyhow::Result<()> {
    let upload = statements(&[(2566, 80_000_000.0), (2567, 90_000_000.0)], 900_000_000.0)
        .sheet("Ratios", RATIO_TITLE)
        .text("C1", "บริษัท พร้อมเข้าตลาด จำกัด")
        .upload("persist.xlsx")?;
    let result = analyze_uploads(&[upload])?.assessment;

    let store = InMemoryAssessmentStore::new();
    let id = save_assessment(&store, &result)?;

    let record = store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("record {} not stored", id))?;
    assert_eq!(record.project.client, "บริษัท พร้อมเข้าตลาด จำกัด");
    assert!(!record.set_eligible);
    assert!(record.mai_eligible);
    assert_eq!(record.readiness_level, ReadinessLevel::MaiReady);

    let restored: AssessmentResult = serde_json::from_str(&record.snapshot)?;
    assert_eq!(restored.readiness_score, 75);
    Ok(())
}

#[test]
fn test_markdown_report_from_upload() -> anyhow::Result<()> {
    let upload = statements(&[(2566, 80_000_000.0), (2567, 90_000_000.0)], 900_000_000.0)
        .upload("report.xlsx")?;
    let markdown = analyze_uploads(&[upload])?.assessment.to_markdown();

    assert!(markdown.contains("พร้อมสำหรับ mai (75/100)"));
    assert!(markdown.contains("90.00 ล้านบาท"));
    assert!(markdown.contains("FAIL"));
    Ok(())
}
