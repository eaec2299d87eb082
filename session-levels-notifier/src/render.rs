//! Chart rendering seam.
//!
//! Image rendering is left to external implementations of [`ChartRenderer`]. The job ships with
//! [`NoChart`] and [`CsvRenderer`], which attaches the window and its levels as a chart-ready
//! dataset.

use crate::error::NotifierError;
use session_levels::{LevelMap, SessionWindow};

/// File attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Renders a window and its levels into an optional attachment.
pub trait ChartRenderer: Send + Sync {
    fn render(
        &self,
        ticker: &str,
        window: &SessionWindow<'_>,
        levels: &LevelMap,
    ) -> Result<Option<Attachment>, NotifierError>;
}

/// Renders nothing, notifications are sent as text only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChart;

impl ChartRenderer for NoChart {
    fn render(
        &self,
        _: &str,
        _: &SessionWindow<'_>,
        _: &LevelMap,
    ) -> Result<Option<Attachment>, NotifierError> {
        Ok(None)
    }
}

/// One CSV row per bar, with every level (anchor included) repeated as a horizontal line column.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl ChartRenderer for CsvRenderer {
    fn render(
        &self,
        ticker: &str,
        window: &SessionWindow<'_>,
        levels: &LevelMap,
    ) -> Result<Option<Attachment>, NotifierError> {
        let level_rows = levels.iter_with_anchor().collect::<Vec<_>>();
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(
            ["time", "open", "high", "low", "close"]
                .into_iter()
                .chain(level_rows.iter().map(|(name, _)| *name)),
        )?;

        for bar in window.bars() {
            writer.write_record(
                [
                    bar.time.to_rfc3339(),
                    bar.open.to_string(),
                    bar.high.to_string(),
                    bar.low.to_string(),
                    bar.close.to_string(),
                ]
                .into_iter()
                .chain(level_rows.iter().map(|(_, price)| price.to_string())),
            )?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|error| NotifierError::Render(error.to_string()))?;

        Ok(Some(Attachment {
            file_name: format!("{}_levels.csv", ticker.to_lowercase()),
            content_type: "text/csv".to_string(),
            bytes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use session_levels::{Bar, compute_default_levels};

    #[test]
    fn test_csv_renderer() {
        let time = DateTime::from_timestamp(1_709_562_600, 0).unwrap();
        let bars = vec![
            Bar::new(time, 100.0, 102.0, 99.0, 101.0, 1.0),
            Bar::new(time + chrono::Duration::minutes(1), 101.0, 103.0, 100.5, 102.0, 1.0),
        ];
        let window = SessionWindow::new(&bars).unwrap();
        let levels = compute_default_levels(&window);

        let attachment = CsvRenderer.render("ESUSDT", &window, &levels).unwrap().unwrap();
        let text = String::from_utf8(attachment.bytes).unwrap();
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(attachment.file_name, "esusdt_levels.csv");
        assert_eq!(attachment.content_type, "text/csv");
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "time,open,high,low,close,P50 H,P50 L,P75 H,P75 L,P90 H,P90 L,ANCHOR"
        );
        assert_eq!(
            lines[1],
            "2024-03-04T14:30:00+00:00,100,102,99,101,102,100.5,103,99,103,99,100"
        );

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        let records = reader.records().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(headers.len(), 12);
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][0], "2024-03-04T14:31:00+00:00");
        assert_eq!(&records[1][11], "100");
    }

    #[test]
    fn test_no_chart_renders_nothing() {
        let time = DateTime::from_timestamp(1_709_562_600, 0).unwrap();
        let bars = vec![Bar::new(time, 100.0, 102.0, 99.0, 101.0, 1.0)];
        let window = SessionWindow::new(&bars).unwrap();
        let levels = compute_default_levels(&window);

        assert_eq!(NoChart.render("ESUSDT", &window, &levels), Ok(None));
    }
}
