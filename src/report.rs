use std::path::Path;

use plotters::prelude::*;
use tabled::Tabled;

use crate::batch::ComparisonRow;
use crate::error::ElectionError;

const AU_BLUE: RGBColor = RGBColor(0x00, 0x3d, 0x73);
const AU_GREEN: RGBColor = RGBColor(0x8b, 0xad, 0x3f);

#[derive(Tabled)]
struct DisplayRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "std_msgs")]
    std_msgs: u32,
    #[tabled(rename = "std_time")]
    std_time: String,
    #[tabled(rename = "imp_msgs")]
    imp_msgs: u32,
    #[tabled(rename = "imp_time")]
    imp_time: String,
}

impl From<&ComparisonRow> for DisplayRow {
    fn from(row: &ComparisonRow) -> Self {
        DisplayRow {
            index: row.index,
            std_msgs: row.std_msgs,
            std_time: format!("{:.3}s", row.std_time_secs),
            imp_msgs: row.imp_msgs,
            imp_time: format!("{:.3}s", row.imp_time_secs),
        }
    }
}

/// Render the `(#, std_msgs, std_time, imp_msgs, imp_time)` table for
/// stdout display.
pub fn render_table(rows: &[ComparisonRow]) -> String {
    let display_rows: Vec<DisplayRow> = rows.iter().map(DisplayRow::from).collect();
    tabled::Table::new(display_rows).to_string()
}

/// Write the same table as a LaTeX `tabular` environment. `tabled` has no
/// LaTeX backend, so this formats the rows directly.
pub fn write_latex(rows: &[ComparisonRow], path: &Path) -> Result<(), ElectionError> {
    let mut out = String::new();
    out.push_str("\\begin{tabular}{rrrrr}\n\\toprule\n");
    out.push_str("# & std\\_msgs & std\\_time & imp\\_msgs & imp\\_time \\\\\n\\midrule\n");
    for row in rows {
        out.push_str(&format!(
            "{} & {} & {:.3} & {} & {:.3} \\\\\n",
            row.index, row.std_msgs, row.std_time_secs, row.imp_msgs, row.imp_time_secs
        ));
    }
    out.push_str("\\bottomrule\n\\end{tabular}\n");

    std::fs::write(path, out)
        .map_err(|e| ElectionError::Report(format!("failed to write {}: {e}", path.display())))
}

/// Two-panel log-scale bar chart: message counts on top, run times on the
/// bottom, Standard vs Improved side by side per test index.
pub fn plot_chart(rows: &[ComparisonRow], path: &Path) -> Result<(), ElectionError> {
    if rows.is_empty() {
        return Err(ElectionError::Report("no rows to plot".to_string()));
    }

    let root = BitMapBackend::new(path, (900, 900)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ElectionError::Report(format!("failed to fill chart background: {e}")))?;
    let (top, bottom) = root.split_vertically(450);

    draw_panel(&top, rows, "Message count", |r| (r.std_msgs as f64, r.imp_msgs as f64))?;
    draw_panel(&bottom, rows, "Run time", |r| (r.std_time_secs, r.imp_time_secs))?;

    root.present()
        .map_err(|e| ElectionError::Report(format!("failed to save chart: {e}")))?;
    Ok(())
}

fn draw_panel<DB, F>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    rows: &[ComparisonRow],
    title: &str,
    extract: F,
) -> Result<(), ElectionError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    F: Fn(&ComparisonRow) -> (f64, f64),
{
    let n = rows.len();
    let max_value = rows
        .iter()
        .map(extract)
        .flat_map(|(s, i)| [s, i])
        .fold(1.0_f64, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n as f64, (0.1f64..(max_value * 2.0)).log_scale())
        .map_err(|e| ElectionError::Report(format!("failed to build chart axes: {e}")))?;

    chart
        .configure_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| format!("{}", *x as usize))
        .draw()
        .map_err(|e| ElectionError::Report(format!("failed to draw chart mesh: {e}")))?;

    let bar_width = 0.35;
    chart
        .draw_series(rows.iter().enumerate().map(|(i, row)| {
            let (std_value, _) = extract(row);
            let x0 = i as f64 + 0.5 - bar_width;
            let x1 = i as f64 + 0.5;
            Rectangle::new([(x0, 0.1), (x1, std_value.max(0.1))], AU_BLUE.filled())
        }))
        .map_err(|e| ElectionError::Report(format!("failed to draw standard series: {e}")))?
        .label("Standard")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], AU_BLUE.filled()));

    chart
        .draw_series(rows.iter().enumerate().map(|(i, row)| {
            let (_, imp_value) = extract(row);
            let x0 = i as f64 + 0.5;
            let x1 = i as f64 + 0.5 + bar_width;
            Rectangle::new([(x0, 0.1), (x1, imp_value.max(0.1))], AU_GREEN.filled())
        }))
        .map_err(|e| ElectionError::Report(format!("failed to draw improved series: {e}")))?
        .label("Improved")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], AU_GREEN.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(|e| ElectionError::Report(format!("failed to draw chart legend: {e}")))?;

    Ok(())
}
