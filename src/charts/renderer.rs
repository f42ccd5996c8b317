//! Static Chart Renderer
//! Draws the exploratory sales charts with plotters into in-memory bitmaps.
//!
//! Charts:
//! 1. Monthly Sales and Profit line chart with markers
//! 2. Sales (left axis) and Profit (right axis) bars by Category
//! 3. Top-N Sub-Categories by Sales, Sales and Profit side by side
//! 4. Bottom-N Sub-Categories by Profit in a red palette
//! 5. Discount vs. Profit scatter colored by Category with a zero line

use crate::charts::figure::{
    category_color, label_at, reds_palette, value_range, ChartError, Figure, PROFIT_COLOR,
    SALES_COLOR, ZERO_LINE_COLOR,
};
use crate::data::SalesRecord;
use crate::stats::{GroupTotal, MonthlyTotal};
use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeSet;

type DrawResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render into a fresh RGB buffer and wrap it as a [`Figure`].
    fn render<F>(
        title: &str,
        file_stem: &str,
        (width, height): (u32, u32),
        draw: F,
    ) -> Result<Figure, ChartError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult,
    {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(ChartError::drawing)?;
            draw(&root).map_err(ChartError::drawing)?;
            root.present().map_err(ChartError::drawing)?;
        }

        let image = RgbImage::from_raw(width, height, buffer).ok_or(ChartError::Buffer)?;
        Ok(Figure {
            title: title.to_string(),
            file_stem: file_stem.to_string(),
            image,
        })
    }

    /// Monthly Sales and Profit over time.
    pub fn monthly_trend(monthly: &[MonthlyTotal]) -> Result<Figure, ChartError> {
        let title = "Monthly Sales and Profit Over Time";
        if monthly.is_empty() {
            return Err(ChartError::Empty(title.to_string()));
        }

        let labels: Vec<String> = monthly
            .iter()
            .map(|m| m.month_end.format("%Y-%m").to_string())
            .collect();
        let x_max = (monthly.len().saturating_sub(1)).max(1) as f64;
        let (y_min, y_max) = value_range(monthly.iter().flat_map(|m| [m.sales, m.profit]), false);
        let sales: Vec<(f64, f64)> = monthly
            .iter()
            .enumerate()
            .map(|(i, m)| (i as f64, m.sales))
            .collect();
        let profit: Vec<(f64, f64)> = monthly
            .iter()
            .enumerate()
            .map(|(i, m)| (i as f64, m.profit))
            .collect();

        Self::render(title, "monthly_sales_profit", (1400, 700), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 28))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(90)
                .build_cartesian_2d(-0.5f64..x_max + 0.5, y_min..y_max)?;

            chart
                .configure_mesh()
                .x_labels(labels.len().clamp(2, 24))
                .x_label_formatter(&|x| label_at(&labels, *x))
                .x_desc("Month")
                .y_desc("Amount ($)")
                .draw()?;

            chart
                .draw_series(LineSeries::new(sales.iter().copied(), SALES_COLOR.stroke_width(2)))?
                .label("Sales")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], SALES_COLOR));
            chart.draw_series(
                sales
                    .iter()
                    .map(|&point| Circle::new(point, 4, SALES_COLOR.filled())),
            )?;

            chart
                .draw_series(LineSeries::new(profit.iter().copied(), PROFIT_COLOR.stroke_width(2)))?
                .label("Profit")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PROFIT_COLOR));
            chart.draw_series(
                profit
                    .iter()
                    .map(|&point| Cross::new(point, 5, PROFIT_COLOR.stroke_width(2))),
            )?;

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperLeft)
                .draw()?;
            Ok(())
        })
    }

    /// Sales and Profit per Category on two y axes.
    pub fn category_performance(groups: &[GroupTotal]) -> Result<Figure, ChartError> {
        let title = "Total Sales and Profit by Category";
        if groups.is_empty() {
            return Err(ChartError::Empty(title.to_string()));
        }

        let n = groups.len();
        let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
        let (_, sales_max) = value_range(groups.iter().map(|g| g.sales), true);
        let (profit_min, profit_max) = value_range(groups.iter().map(|g| g.profit), true);

        Self::render(title, "category_performance", (1000, 600), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(90)
                .right_y_label_area_size(90)
                .build_cartesian_2d((0..n).into_segmented(), 0f64..sales_max)?
                .set_secondary_coord((0..n).into_segmented(), profit_min..profit_max);

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_label_formatter(&|v| segment_label(&names, v))
                .x_desc("Category")
                .y_desc("Total Sales ($)")
                .draw()?;
            chart
                .configure_secondary_axes()
                .y_desc("Total Profit ($)")
                .draw()?;

            chart
                .draw_series(groups.iter().enumerate().map(|(i, g)| {
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::Exact(i), 0.0),
                            (SegmentValue::CenterOf(i), g.sales),
                        ],
                        SALES_COLOR.filled(),
                    );
                    bar.set_margin(0, 0, 6, 1);
                    bar
                }))?
                .label("Sales")
                .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], SALES_COLOR.filled()));

            chart
                .draw_secondary_series(groups.iter().enumerate().map(|(i, g)| {
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::CenterOf(i), 0.0),
                            (SegmentValue::Exact(i + 1), g.profit),
                        ],
                        PROFIT_COLOR.filled(),
                    );
                    bar.set_margin(0, 0, 1, 6);
                    bar
                }))?
                .label("Profit")
                .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], PROFIT_COLOR.filled()));

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
            Ok(())
        })
    }

    /// Sales and Profit bars for the best-selling Sub-Categories.
    pub fn top_subcategories(groups: &[GroupTotal]) -> Result<Figure, ChartError> {
        let title = format!("Top {} Sub-Categories by Sales & Profit", groups.len());
        if groups.is_empty() {
            return Err(ChartError::Empty(title));
        }

        let n = groups.len();
        let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
        let (y_min, y_max) = value_range(groups.iter().flat_map(|g| [g.sales, g.profit]), true);

        Self::render(&title, "top_subcategories_sales", (1200, 700), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(&title, ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(60)
                .y_label_area_size(90)
                .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_label_formatter(&|v| segment_label(&names, v))
                .x_label_style(("sans-serif", 13))
                .x_desc("Sub-Category")
                .y_desc("Amount ($)")
                .draw()?;

            chart
                .draw_series(groups.iter().enumerate().map(|(i, g)| {
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::Exact(i), 0.0),
                            (SegmentValue::CenterOf(i), g.sales),
                        ],
                        SALES_COLOR.filled(),
                    );
                    bar.set_margin(0, 0, 4, 1);
                    bar
                }))?
                .label("Sales")
                .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], SALES_COLOR.filled()));

            chart
                .draw_series(groups.iter().enumerate().map(|(i, g)| {
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::CenterOf(i), 0.0),
                            (SegmentValue::Exact(i + 1), g.profit),
                        ],
                        PROFIT_COLOR.filled(),
                    );
                    bar.set_margin(0, 0, 1, 4);
                    bar
                }))?
                .label("Profit")
                .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], PROFIT_COLOR.filled()));

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
            Ok(())
        })
    }

    /// Profit bars for the least profitable Sub-Categories, worst first.
    pub fn bottom_subcategories(groups: &[GroupTotal]) -> Result<Figure, ChartError> {
        let title = format!("Bottom {} Sub-Categories by Profit", groups.len());
        if groups.is_empty() {
            return Err(ChartError::Empty(title));
        }

        let n = groups.len();
        let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
        let colors = reds_palette(n);
        let (y_min, y_max) = value_range(groups.iter().map(|g| g.profit), true);

        Self::render(&title, "bottom_subcategories_profit", (1200, 700), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(&title, ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(60)
                .y_label_area_size(90)
                .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_label_formatter(&|v| segment_label(&names, v))
                .x_label_style(("sans-serif", 13))
                .x_desc("Sub-Category")
                .y_desc("Total Profit ($)")
                .draw()?;

            chart.draw_series(groups.iter().enumerate().map(|(i, g)| {
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), g.profit),
                    ],
                    colors[i].filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))?;
            Ok(())
        })
    }

    /// Profit against Discount for a sample of orders, one color per Category.
    pub fn discount_vs_profit(sample: &[SalesRecord]) -> Result<Figure, ChartError> {
        let title = "Profit vs. Discount";
        if sample.is_empty() {
            return Err(ChartError::Empty(title.to_string()));
        }

        let categories: Vec<&str> = sample
            .iter()
            .map(|r| r.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let (x_min, x_max) = value_range(sample.iter().map(|r| r.discount), true);
        let (y_min, y_max) = value_range(sample.iter().map(|r| r.profit), true);

        Self::render(title, "discount_vs_profit", (1000, 600), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(90)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

            chart
                .configure_mesh()
                .x_desc("Discount")
                .y_desc("Profit")
                .draw()?;

            for (idx, category) in categories.iter().enumerate() {
                let color = category_color(idx);
                chart
                    .draw_series(
                        sample
                            .iter()
                            .filter(|r| r.category == *category)
                            .map(|r| Circle::new((r.discount, r.profit), 4, color.mix(0.7).filled())),
                    )?
                    .label(*category)
                    .legend(move |(x, y)| Circle::new((x + 6, y), 4, color.filled()));
            }

            chart
                .draw_series(LineSeries::new(
                    [(x_min, 0.0), (x_max, 0.0)],
                    ZERO_LINE_COLOR.stroke_width(2),
                ))?
                .label("No Profit")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ZERO_LINE_COLOR));

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperRight)
                .draw()?;
            Ok(())
        })
    }
}

/// Group name under the center of its segment; blank elsewhere.
fn segment_label(names: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) => names.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_are_rejected() {
        assert!(matches!(
            StaticChartRenderer::monthly_trend(&[]),
            Err(ChartError::Empty(_))
        ));
        assert!(matches!(
            StaticChartRenderer::category_performance(&[]),
            Err(ChartError::Empty(_))
        ));
        assert!(matches!(
            StaticChartRenderer::discount_vs_profit(&[]),
            Err(ChartError::Empty(_))
        ));
    }

    fn sample_groups() -> Vec<GroupTotal> {
        vec![
            GroupTotal {
                name: "Phones".into(),
                sales: 750.0,
                profit: 130.0,
            },
            GroupTotal {
                name: "Tables".into(),
                sales: 50.0,
                profit: -30.0,
            },
        ]
    }

    #[test]
    fn test_charts_render_at_their_sizes() {
        let date = chrono::NaiveDate::from_ymd_opt(2017, 4, 30).unwrap();
        let monthly = vec![MonthlyTotal {
            month_end: date,
            sales: 300.0,
            profit: 70.0,
        }];
        let sample = vec![SalesRecord {
            order_date: date,
            sales: 100.0,
            profit: -12.5,
            category: "Furniture".into(),
            sub_category: "Tables".into(),
            discount: 0.3,
        }];
        let groups = sample_groups();

        let figures = [
            StaticChartRenderer::monthly_trend(&monthly).unwrap(),
            StaticChartRenderer::category_performance(&groups).unwrap(),
            StaticChartRenderer::top_subcategories(&groups).unwrap(),
            StaticChartRenderer::bottom_subcategories(&groups).unwrap(),
            StaticChartRenderer::discount_vs_profit(&sample).unwrap(),
        ];
        let sizes: Vec<(u32, u32)> = figures.iter().map(|f| f.image.dimensions()).collect();
        assert_eq!(
            sizes,
            vec![(1400, 700), (1000, 600), (1200, 700), (1200, 700), (1000, 600)]
        );
        assert_eq!(figures[2].title, "Top 2 Sub-Categories by Sales & Profit");
        assert_eq!(figures[3].file_stem, "bottom_subcategories_profit");
        // Something other than the white background was drawn
        assert!(figures[0].image.pixels().any(|p| p.0 != [255, 255, 255]));
    }

    #[test]
    fn test_segment_label() {
        let names = vec!["Chairs".to_string(), "Phones".to_string()];
        assert_eq!(segment_label(&names, &SegmentValue::CenterOf(1)), "Phones");
        assert_eq!(segment_label(&names, &SegmentValue::Exact(1)), "");
        assert_eq!(segment_label(&names, &SegmentValue::CenterOf(7)), "");
    }
}
