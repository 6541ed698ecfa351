//! Horizontal bar charts rendered as standalone SVG documents.

const WIDTH: f64 = 1200.0;
const ROW_HEIGHT: f64 = 34.0;
const MARGIN_LEFT: f64 = 280.0;
const MARGIN_RIGHT: f64 = 90.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 80.0;
const TICKS: usize = 5;

// coolwarm endpoints
const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

/// One labelled bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

impl Bar {
    pub fn new(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// Render `bars` top to bottom in the given order.
///
/// The x axis always includes zero; negative values extend left of it.
pub fn render_bar_chart(title: &str, x_label: &str, y_label: &str, bars: &[Bar]) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = ROW_HEIGHT * bars.len().max(1) as f64;
    let height = MARGIN_TOP + plot_h + MARGIN_BOTTOM;

    let finite = bars.iter().map(|b| b.value).filter(|v| v.is_finite());
    let lo = finite.clone().fold(0.0_f64, f64::min);
    let hi = finite.fold(0.0_f64, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };
    let scale = plot_w / span;
    let x_of = |v: f64| MARGIN_LEFT + (v - lo) * scale;
    let zero_x = x_of(0.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n",
        w = WIDTH,
        h = height
    ));
    svg.push_str(&format!(
        "  <rect width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
        WIDTH, height
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"36\" font-size=\"18\" font-weight=\"bold\" text-anchor=\"middle\">{}</text>\n",
        WIDTH / 2.0,
        escape(title)
    ));

    // grid and tick labels
    for i in 0..=TICKS {
        let v = lo + span * i as f64 / TICKS as f64;
        let x = x_of(v);
        svg.push_str(&format!(
            "  <line x1=\"{x:.1}\" y1=\"{y1:.1}\" x2=\"{x:.1}\" y2=\"{y2:.1}\" stroke=\"#dddddd\"/>\n",
            x = x,
            y1 = MARGIN_TOP,
            y2 = MARGIN_TOP + plot_h
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">{:.0}</text>\n",
            x,
            MARGIN_TOP + plot_h + 18.0,
            v
        ));
    }

    for (i, bar) in bars.iter().enumerate() {
        let y = MARGIN_TOP + ROW_HEIGHT * i as f64;
        let value = if bar.value.is_finite() { bar.value } else { 0.0 };
        let end = x_of(value);
        let (x, w) = if end >= zero_x {
            (zero_x, end - zero_x)
        } else {
            (end, zero_x - end)
        };
        let (r, g, b) = shade((value - lo) / span);

        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"end\">{}</text>\n",
            MARGIN_LEFT - 8.0,
            y + ROW_HEIGHT * 0.62,
            escape(&bar.label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"rgb({},{},{})\"/>\n",
            x,
            y + 4.0,
            w,
            ROW_HEIGHT - 8.0,
            r,
            g,
            b
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{:.2}</text>\n",
            x + w + 4.0,
            y + ROW_HEIGHT * 0.62,
            value
        ));
    }

    svg.push_str(&format!(
        "  <line x1=\"{x:.1}\" y1=\"{y1:.1}\" x2=\"{x:.1}\" y2=\"{y2:.1}\" stroke=\"#333333\"/>\n",
        x = zero_x,
        y1 = MARGIN_TOP,
        y2 = MARGIN_TOP + plot_h
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\">{}</text>\n",
        MARGIN_LEFT + plot_w / 2.0,
        height - 24.0,
        escape(x_label)
    ));
    svg.push_str(&format!(
        "  <text x=\"20\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\" transform=\"rotate(-90 20 {:.1})\">{}</text>\n",
        MARGIN_TOP + plot_h / 2.0,
        MARGIN_TOP + plot_h / 2.0,
        escape(y_label)
    ));
    svg.push_str("</svg>\n");
    svg
}

fn shade(t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    (mix(COLD.0, WARM.0), mix(COLD.1, WARM.1), mix(COLD.2, WARM.2))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
