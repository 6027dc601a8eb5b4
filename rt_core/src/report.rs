//! # Report Generation
//!
//! Lays out the shot & safety report and renders it as plain text or as a PDF
//! compiled with Typst.
//!
//! ## Layout
//!
//! The report is a flat list of [`ReportLine`]s in six fixed sections. Lines
//! are placed top to bottom on US-letter pages, all measured in points:
//!
//! - First line at y = 40, left edge at x = 40
//! - 16 pt between lines, 22 pt after the title
//! - When the next position passes y = 740 a new page starts back at y = 40
//!
//! ## Example
//!
//! ```rust,no_run
//! use rt_core::calculations::calculate;
//! use rt_core::config::EngineConfig;
//! use rt_core::report::render_report_pdf;
//! use rt_core::snapshot::InputSnapshot;
//!
//! let snapshot = InputSnapshot::default().with_starter_entries();
//! let result = calculate(&snapshot, &EngineConfig::default());
//! let pdf_bytes = render_report_pdf(&snapshot, &result).unwrap();
//! std::fs::write("RT_Shot_Safety_Report.pdf", pdf_bytes).unwrap();
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::{CalculationResult, PUBLIC_DOSE_LIMIT_MR_HR, RADIATION_AREA_LIMIT_MR_HR};
use crate::errors::{RtError, RtResult};
use crate::snapshot::{format_number, InputSnapshot};

pub const REPORT_TITLE: &str = "RT Shot & Safety Calculator v2 Report";

/// Suggested file name for the exported PDF
pub const REPORT_FILE_NAME: &str = "RT_Shot_Safety_Report_v2.pdf";

pub const PAGE_TOP_PT: f64 = 40.0;
pub const PAGE_LEFT_PT: f64 = 40.0;
pub const LINE_GAP_PT: f64 = 16.0;
pub const TITLE_GAP_PT: f64 = 22.0;

/// A line placed below this y forces a page break
pub const PAGE_BREAK_Y_PT: f64 = 740.0;

// ============================================================================
// Report content
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
}

impl LineStyle {
    pub fn font_size_pt(&self) -> f64 {
        match self {
            LineStyle::Title => 14.0,
            LineStyle::Heading | LineStyle::Body => 10.0,
        }
    }

    pub fn is_bold(&self) -> bool {
        !matches!(self, LineStyle::Body)
    }

    /// Vertical advance after a line of this style
    pub fn gap_after_pt(&self) -> f64 {
        match self {
            LineStyle::Title => TITLE_GAP_PT,
            LineStyle::Heading | LineStyle::Body => LINE_GAP_PT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
    pub text: String,
    pub style: LineStyle,
}

impl ReportLine {
    fn title(text: impl Into<String>) -> Self {
        ReportLine { text: text.into(), style: LineStyle::Title }
    }

    fn heading(text: impl Into<String>) -> Self {
        ReportLine { text: text.into(), style: LineStyle::Heading }
    }

    fn body(text: impl Into<String>) -> Self {
        ReportLine { text: text.into(), style: LineStyle::Body }
    }
}

/// Blank job fields print as "-"
fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn or_zero(value: Option<f64>) -> String {
    match value {
        Some(_) => format_number(value),
        None => "0".to_string(),
    }
}

/// Build the report lines for a snapshot and its computed results.
pub fn build_report(snapshot: &InputSnapshot, result: &CalculationResult) -> Vec<ReportLine> {
    let mut lines = vec![ReportLine::title(REPORT_TITLE)];

    lines.push(ReportLine::heading("Section 1 — Job Information"));
    lines.push(ReportLine::body(format!("Unit / Site: {}", or_dash(&snapshot.job.unit_site))));
    lines.push(ReportLine::body(format!("Date: {}", or_dash(&snapshot.job.job_date))));
    lines.push(ReportLine::body(format!(
        "Drawing Number: {}",
        or_dash(&snapshot.job.drawing_number)
    )));
    lines.push(ReportLine::body(format!("CML: {}", or_dash(&snapshot.job.cml))));

    lines.push(ReportLine::heading("Section 2 — Source Information"));
    lines.push(ReportLine::body(format!("Isotope: {}", snapshot.isotope.code())));
    lines.push(ReportLine::body(format!(
        "Constant (mR/hr per Ci @ 1 ft): {}",
        result.isotope_constant
    )));
    lines.push(ReportLine::body(format!("Focus Spot (d): {}", or_zero(snapshot.focus_spot_in))));
    lines.push(ReportLine::body(format!(
        "Source Activity (Ci): {}",
        or_zero(snapshot.source_activity_ci)
    )));

    lines.push(ReportLine::heading("Section 3 — Boundary Distances"));
    lines.push(ReportLine::body(format!("Time Fraction: {:.4}", result.time_fraction)));
    lines.push(ReportLine::body(format!(
        "{} mR/hr Boundary: {:.1} ft",
        PUBLIC_DOSE_LIMIT_MR_HR, result.boundary_public_ft
    )));
    lines.push(ReportLine::body(format!(
        "{} mR/hr Boundary: {:.1} ft",
        RADIATION_AREA_LIMIT_MR_HR, result.boundary_radiation_area_ft
    )));

    lines.push(ReportLine::heading("Section 4 — Material Layers"));
    if snapshot.layers.is_empty() {
        lines.push(ReportLine::body("No material layers entered."));
    } else {
        for (index, layer) in snapshot.layers.iter().enumerate() {
            lines.push(ReportLine::body(format!(
                "Layer {}: {}, Thickness {} in, HVL {}",
                index + 1,
                layer.material,
                layer.thickness_in,
                layer.hvl_count
            )));
        }
    }
    lines.push(ReportLine::body(format!(
        "Total attenuation factor: {:.6}",
        result.attenuation_factor
    )));

    lines.push(ReportLine::heading("Section 5 — Shot Cards"));
    if result.shots.is_empty() {
        lines.push(ReportLine::body("No shots entered."));
    } else {
        for (index, shot) in result.shots.iter().enumerate() {
            lines.push(ReportLine::body(format!(
                "Shot {}: PDD {:.3} in | SPD {:.3} in",
                index + 1,
                shot.pdd_in,
                shot.spd_in
            )));
            lines.push(ReportLine::body(format!(
                "  UG {:.4} | Mag {:.4} | Blow-up {:.1}%",
                shot.ug, shot.magnification, shot.blow_up_percent
            )));
            lines.push(ReportLine::body(format!(
                "  Req SPD (UG): {:.3} in | Req SPD (20%): {:.3} in | Req SPD Final: {:.3} in",
                shot.required_spd_for_ug, shot.required_spd_for_blow_up, shot.required_spd_final
            )));
            if let Some(rec) = &shot.recommendation {
                let multiplier = if rec.required_multiplier > 0 {
                    format!("{}x", rec.required_multiplier)
                } else {
                    "-".to_string()
                };
                lines.push(ReportLine::body(format!(
                    "  Multiplier: {} | Recommended SPD: {:.3} in | UG @ Recommended: {:.4}",
                    multiplier, rec.recommended_spd_in, rec.ug_at_recommended
                )));
            }
            let mut status = format!("  UG Status: {}", shot.ug_status.label());
            if let Some(blow_up) = shot.blow_up_status {
                status.push_str(&format!(" | Blow-up Status: {}", blow_up.label()));
            }
            lines.push(ReportLine::body(status));
        }
    }

    lines.push(ReportLine::heading("Section 6 — Exposure Time"));
    lines.push(ReportLine::body(format!(
        "Estimated exposure time: {:.1} minutes",
        result.exposure_minutes
    )));

    lines
}

// ============================================================================
// Pagination
// ============================================================================

/// A line with its vertical position on the page, in points from the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub line: ReportLine,
    pub y_pt: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportPage {
    pub lines: Vec<PlacedLine>,
}

/// Place lines onto pages.
///
/// Each line goes at the current y, then y advances by the line's gap. Once y
/// passes [`PAGE_BREAK_Y_PT`] the next line starts a new page. No trailing
/// empty page is produced.
pub fn paginate(lines: &[ReportLine]) -> Vec<ReportPage> {
    let mut pages = Vec::new();
    let mut current = ReportPage::default();
    let mut y = PAGE_TOP_PT;

    for line in lines {
        current.lines.push(PlacedLine { line: line.clone(), y_pt: y });
        y += line.style.gap_after_pt();
        if y > PAGE_BREAK_Y_PT {
            pages.push(std::mem::take(&mut current));
            y = PAGE_TOP_PT;
        }
    }

    if !current.lines.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

/// Render the report as plain text, pages separated by a form feed.
pub fn render_report_text(snapshot: &InputSnapshot, result: &CalculationResult) -> String {
    paginate(&build_report(snapshot, result))
        .iter()
        .map(|page| {
            page.lines
                .iter()
                .map(|placed| placed.line.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\u{c}\n")
}

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling one in-memory document.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    /// Fonts bundled with typst-assets
    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// PDF rendering
// ============================================================================

const PAGE_SETUP: &str = r##"#set page(paper: "us-letter", margin: 0pt)
#set text(font: "DejaVu Sans Mono", size: 10pt)
#set document(title: "{{TITLE}}")
"##;

/// Escape text for a Typst string literal
fn escape_typst_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\\' => "\\\\".to_string(),
            '"' => "\\\"".to_string(),
            '\n' => "\\n".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Typst markup for one placed line.
///
/// Layout positions are baselines; Typst places boxes by their top edge.
fn place_line(placed: &PlacedLine) -> String {
    let style = placed.line.style;
    let indent = placed.line.text.len() - placed.line.text.trim_start().len();
    let dx = PAGE_LEFT_PT + indent as f64 * style.font_size_pt() * 0.6;
    let dy = (placed.y_pt - style.font_size_pt()).max(0.0);
    let weight = if style.is_bold() { "bold" } else { "regular" };

    format!(
        "#place(top + left, dx: {:.1}pt, dy: {:.1}pt, text(size: {}pt, weight: \"{}\", \"{}\"))\n",
        dx,
        dy,
        style.font_size_pt(),
        weight,
        escape_typst_string(placed.line.text.trim_start())
    )
}

/// Typst source for the paginated report.
fn report_source(pages: &[ReportPage]) -> String {
    let mut source = PAGE_SETUP.replace("{{TITLE}}", &escape_typst_string(REPORT_TITLE));

    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            source.push_str("#pagebreak()\n");
        }
        for placed in &page.lines {
            source.push_str(&place_line(placed));
        }
    }

    source
}

/// Render the report to PDF bytes.
pub fn render_report_pdf(
    snapshot: &InputSnapshot,
    result: &CalculationResult,
) -> RtResult<Vec<u8>> {
    let pages = paginate(&build_report(snapshot, result));
    let world = PdfWorld::new(report_source(&pages));

    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        RtError::report_failed("compile", error_msgs.join("; "))
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        RtError::report_failed("pdf", error_msgs.join("; "))
    })?;

    tracing::info!(pages = pages.len(), bytes = pdf_bytes.len(), "rendered report");
    Ok(pdf_bytes)
}
