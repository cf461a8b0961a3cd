use gnuplot::PlotOption::LineWidth;
use gnuplot::{AxesCommon, Caption, Color, Figure};

use crate::{ToolsError, Trace};

/// Hands a finished [`Trace`] to gnuplot.
///
/// The x axis is the sample index, the y axis the traced channel.
#[derive(Debug, Clone)]
pub struct PlotSink {
    title: String,
    colour: &'static str,
}

impl PlotSink {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            colour: "blue",
        }
    }

    pub fn with_colour(mut self, colour: &'static str) -> Self {
        self.colour = colour;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Build the figure without opening gnuplot.
    pub fn figure(&self, trace: &Trace) -> Figure {
        let (xs, ys) = series(trace);
        let mut figure = Figure::new();
        let axes = figure.axes2d();
        axes.set_title(&format!("{} - {}", self.title, trace.system), &[]);
        axes.set_x_label("sample", &[]);
        axes.set_y_label(trace.channel.label(), &[]);
        axes.lines(
            &xs,
            &ys,
            &[Color(self.colour), LineWidth(2.0), Caption(trace.channel.label())],
        );
        figure
    }

    /// Open a gnuplot window for `trace`. Returns once gnuplot has the data.
    pub fn show(&self, trace: &Trace) -> Result<(), ToolsError> {
        if trace.values.is_empty() {
            return Err(ToolsError::EmptyTrace);
        }
        let mut figure = self.figure(trace);
        figure
            .show_and_keep_running()
            .map_err(|e| ToolsError::Plot(e.to_string()))?;
        tracing::info!(title = %self.title, samples = trace.values.len(), "trace plotted");
        Ok(())
    }
}

/// Sample indices and values, ready for a 2D line plot.
pub fn series(trace: &Trace) -> (Vec<f64>, Vec<f64>) {
    let xs = (0..trace.values.len()).map(|i| i as f64).collect();
    (xs, trace.values.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Channel;

    fn trace(values: Vec<f64>) -> Trace {
        Trace {
            system: "pendulum".into(),
            channel: Channel::Theta,
            ticks: (1..=values.len() as u64).collect(),
            values,
        }
    }

    #[test]
    fn series_uses_sample_index() {
        let (xs, ys) = series(&trace(vec![0.5, 0.4, 0.2]));
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert_eq!(ys, vec![0.5, 0.4, 0.2]);
    }

    #[test]
    fn empty_trace_is_rejected_before_gnuplot() {
        let sink = PlotSink::new("theta");
        assert!(matches!(sink.show(&trace(vec![])), Err(ToolsError::EmptyTrace)));
    }

    #[test]
    fn builder_sets_title() {
        let sink = PlotSink::new("Pendulum").with_colour("red");
        assert_eq!(sink.title(), "Pendulum");
    }
}
