// ============================================================
// Layer 6 — Live Chart
// ============================================================
// Text charts of the loss and accuracy curves, redrawn on stdout
// after every epoch. Two panels, each with a training and a test
// curve plotted against the epoch number.

use textplots::{Chart, Plot, Shape};

use crate::domain::session::EpochSummary;

const CHART_WIDTH:  u32 = 120;
const CHART_HEIGHT: u32 = 32;

#[derive(Debug, Clone, Default)]
pub struct LiveChart {
    train_loss: Vec<(f32, f32)>,
    test_loss:  Vec<(f32, f32)>,
    train_acc:  Vec<(f32, f32)>,
    test_acc:   Vec<(f32, f32)>,
}

impl LiveChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, summary: &EpochSummary) {
        let x = summary.epoch as f32;
        push_finite(&mut self.train_loss, x, summary.train_loss);
        push_finite(&mut self.test_loss,  x, summary.test_loss);
        push_finite(&mut self.train_acc,  x, summary.train_acc);
        push_finite(&mut self.test_acc,   x, summary.test_acc);
    }

    pub fn render(&self) -> String {
        let loss_max = self
            .train_loss
            .iter()
            .chain(&self.test_loss)
            .map(|&(_, y)| y)
            .fold(0.0f32, f32::max);
        let loss_max = if loss_max > 0.0 { loss_max * 1.1 } else { 1.0 };

        format!(
            "{}\n{}",
            self.panel("log loss (train, test)", &self.train_loss, &self.test_loss, loss_max),
            self.panel("accuracy (train, test)", &self.train_acc, &self.test_acc, 1.0),
        )
    }

    fn panel(&self, title: &str, train: &[(f32, f32)], test: &[(f32, f32)], ymax: f32) -> String {
        let (xmin, xmax) = self.x_range();
        let train_shape  = Shape::Lines(train);
        let test_shape   = Shape::Lines(test);

        let mut chart = Chart::new_with_y_range(CHART_WIDTH, CHART_HEIGHT, xmin, xmax, 0.0, ymax);
        let chart = chart.lineplot(&train_shape).lineplot(&test_shape);
        chart.axis();
        chart.figures();

        format!("{title}\n{chart}\n")
    }

    // Never a zero-width range, even after the first epoch
    fn x_range(&self) -> (f32, f32) {
        let xs = self.train_acc.iter().chain(&self.test_acc).map(|&(x, _)| x);
        let xmin = xs.clone().fold(f32::INFINITY, f32::min);
        let xmax = xs.fold(f32::NEG_INFINITY, f32::max);
        if xmin.is_finite() && xmax > xmin {
            (xmin, xmax)
        } else if xmin.is_finite() {
            (xmin, xmin + 1.0)
        } else {
            (0.0, 1.0)
        }
    }
}

fn push_finite(series: &mut Vec<(f32, f32)>, x: f32, y: f64) {
    if y.is_finite() {
        series.push((x, y as f32));
    }
}
