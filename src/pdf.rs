use chrono::NaiveDate;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use unicode_width::UnicodeWidthChar;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::overtime::compute_ot;
use crate::report::{monthly_total, trips_cell};
use crate::store::DailyRecord;
use crate::timeutil::format_time;

const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/truetype/liberation-sans",
];

// Colors (RGB 0-1)
const PRIMARY: (f32, f32, f32) = (0.118, 0.227, 0.373); // dark blue banner
const HEADER_BG: (f32, f32, f32) = (0.204, 0.286, 0.369); // table header
const ROW_ALT: (f32, f32, f32) = (0.961, 0.969, 0.976); // zebra stripe
const TEXT_DARK: (f32, f32, f32) = (0.173, 0.243, 0.314);
const WHITE: (f32, f32, f32) = (1.0, 1.0, 1.0);

// Page dimensions (A4 in mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 20.0;

// Date, Trips, Clock-In, Clock-Out, OT, two signature cells
const COL_WIDTHS: [f32; 7] = [24.0, 44.0, 18.0, 18.0, 14.0, 26.0, 26.0];
const HEADERS: [&str; 7] = [
    "Date",
    "Trips",
    "Clock-In",
    "Clock-Out",
    "OT Hours",
    "Your Signature",
    "Supervisor Signature",
];
const ROW_HEIGHT: f32 = 7.0;
const LINE_HEIGHT: f32 = 4.0;
// display columns that fit the trips cell at 8pt
const TRIPS_WRAP_COLS: usize = 30;

pub fn generate_pdf(
    records: &BTreeMap<NaiveDate, DailyRecord>,
    config: &Config,
    month_key: &str,
    supervisor: &str,
) -> AppResult<PathBuf> {
    if records.is_empty() {
        return Err(AppError::Pdf(format!("no records for {month_key}")));
    }

    let (doc, page1, layer1) = PdfDocument::new(
        &format!("Borang Kerja Lebih Masa - {month_key}"),
        Mm(PAGE_W),
        Mm(PAGE_H),
        "Layer 1",
    );

    let mut layer = doc.get_page(page1).get_layer(layer1);

    let font_regular = load_font(&doc, "LiberationSans-Regular.ttf")?;
    let font_bold = load_font(&doc, "LiberationSans-Bold.ttf")?;

    let mut y = PAGE_H - MARGIN;

    // === HEADER BANNER ===
    let banner_height = 18.0;
    draw_rect(
        &layer,
        MARGIN,
        y - banner_height,
        PAGE_W - 2.0 * MARGIN,
        banner_height,
        PRIMARY,
    );
    layer.set_fill_color(Color::Rgb(Rgb::new(WHITE.0, WHITE.1, WHITE.2, None)));
    layer.use_text(
        "BORANG KERJA LEBIH MASA",
        16.0,
        Mm(MARGIN + 6.0),
        Mm(y - 11.5),
        &font_bold,
    );
    y -= banner_height + 8.0;

    // === DOCUMENT HEADER LINES ===
    layer.set_fill_color(Color::Rgb(Rgb::new(
        TEXT_DARK.0,
        TEXT_DARK.1,
        TEXT_DARK.2,
        None,
    )));
    layer.use_text(
        &format!(
            "Nama: {} | Department: {}",
            config.worker_name, config.department
        ),
        10.0,
        Mm(MARGIN),
        Mm(y),
        &font_regular,
    );
    y -= 6.0;
    layer.use_text(
        &format!("Bulan: {month_key}"),
        10.0,
        Mm(MARGIN),
        Mm(y),
        &font_regular,
    );
    y -= 6.0;
    layer.use_text(
        &format!("Nama Ketua: {supervisor}"),
        10.0,
        Mm(MARGIN),
        Mm(y),
        &font_regular,
    );
    y -= 10.0;

    // === TABLE ===
    y = draw_table_header(&layer, &font_bold, y);

    let mut row_idx = 0;
    for (date, record) in records {
        let ot = compute_ot(
            record.clock_in.as_deref(),
            record.clock_out.as_deref(),
            *date,
            &record.trips,
        )?;

        let trip_lines = wrap_text(&trips_cell(record), TRIPS_WRAP_COLS);
        let row_height = ROW_HEIGHT.max(2.5 + LINE_HEIGHT * trip_lines.len() as f32);

        // page break: keep room for the row and the total line below
        if y - row_height < MARGIN + 12.0 {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_W), Mm(PAGE_H), format!("Page {}", row_idx + 2));
            layer = doc.get_page(page).get_layer(page_layer);
            y = draw_table_header(&layer, &font_bold, PAGE_H - MARGIN);
            row_idx = 0;
        }

        if row_idx % 2 == 1 {
            draw_rect(
                &layer,
                MARGIN,
                y - row_height,
                PAGE_W - 2.0 * MARGIN,
                row_height,
                ROW_ALT,
            );
        }

        layer.set_fill_color(Color::Rgb(Rgb::new(
            TEXT_DARK.0,
            TEXT_DARK.1,
            TEXT_DARK.2,
            None,
        )));

        let text_y = y - 5.0;
        let mut x = MARGIN + 2.0;
        layer.use_text(&date.to_string(), 8.0, Mm(x), Mm(text_y), &font_regular);
        x += COL_WIDTHS[0];
        for (i, line) in trip_lines.iter().enumerate() {
            layer.use_text(
                line,
                8.0,
                Mm(x),
                Mm(text_y - LINE_HEIGHT * i as f32),
                &font_regular,
            );
        }
        x += COL_WIDTHS[1];
        layer.use_text(
            &format_time(record.clock_in.as_deref()),
            8.0,
            Mm(x),
            Mm(text_y),
            &font_regular,
        );
        x += COL_WIDTHS[2];
        layer.use_text(
            &format_time(record.clock_out.as_deref()),
            8.0,
            Mm(x),
            Mm(text_y),
            &font_regular,
        );
        x += COL_WIDTHS[3];
        layer.use_text(&format!("{ot:.2}"), 8.0, Mm(x), Mm(text_y), &font_regular);
        // the two signature cells stay blank

        y -= row_height;
        row_idx += 1;
    }

    // === TOTAL ===
    let total = monthly_total(records)?;
    y -= 8.0;
    layer.set_fill_color(Color::Rgb(Rgb::new(
        TEXT_DARK.0,
        TEXT_DARK.1,
        TEXT_DARK.2,
        None,
    )));
    layer.use_text(
        &format!("Jumlah OT Bulan Ini: {total:.2} Jam"),
        10.0,
        Mm(MARGIN),
        Mm(y),
        &font_bold,
    );

    let output_path = get_output_path(month_key);
    let file = File::create(&output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| AppError::Pdf(format!("cannot write PDF: {e}")))?;

    Ok(output_path)
}

fn draw_table_header(layer: &PdfLayerReference, font_bold: &IndirectFontRef, y: f32) -> f32 {
    draw_rect(
        layer,
        MARGIN,
        y - ROW_HEIGHT,
        PAGE_W - 2.0 * MARGIN,
        ROW_HEIGHT,
        HEADER_BG,
    );

    layer.set_fill_color(Color::Rgb(Rgb::new(WHITE.0, WHITE.1, WHITE.2, None)));
    let mut x = MARGIN + 2.0;
    for (i, header) in HEADERS.iter().enumerate() {
        layer.use_text(*header, 7.5, Mm(x), Mm(y - 5.0), font_bold);
        x += COL_WIDTHS[i];
    }

    y - ROW_HEIGHT
}

fn draw_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, color: (f32, f32, f32)) {
    layer.set_fill_color(Color::Rgb(Rgb::new(color.0, color.1, color.2, None)));

    let points = vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y + h)), false),
        (Point::new(Mm(x), Mm(y + h)), false),
    ];

    let polygon = Polygon {
        rings: vec![points],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    };

    layer.add_polygon(polygon);
}

fn load_font(doc: &PdfDocumentReference, filename: &str) -> AppResult<IndirectFontRef> {
    for dir in FONT_DIRS {
        let path = format!("{dir}/{filename}");
        if std::path::Path::new(&path).exists() {
            let font_data = std::fs::read(&path)?;
            return doc
                .add_external_font(&*font_data)
                .map_err(|e| AppError::Pdf(format!("cannot add font: {e}")));
        }
    }
    Err(AppError::Pdf(format!(
        "font {filename} not found, install fonts-liberation"
    )))
}

/// Greedy wrap on whitespace, by display columns.
fn wrap_text(text: &str, max_cols: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_cols = 0;

    for word in text.split_whitespace() {
        let word_cols: usize = word.chars().map(|c| c.width().unwrap_or(0)).sum();

        // a single token wider than the cell gets hard-split
        if word_cols > max_cols {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_cols = 0;
            }
            for c in word.chars() {
                let c_cols = c.width().unwrap_or(0);
                if current_cols + c_cols > max_cols && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_cols = 0;
                }
                current.push(c);
                current_cols += c_cols;
            }
            continue;
        }

        let sep = if current.is_empty() { 0 } else { 1 };
        if current_cols + sep + word_cols > max_cols && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_cols = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_cols += 1;
        }
        current.push_str(word);
        current_cols += word_cols;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn get_output_path(month_key: &str) -> PathBuf {
    let filename = format!(
        "Borang_Kerja_Lebih_Masa_{}.pdf",
        month_key.replace(' ', "_")
    );

    if let Some(home) = dirs::home_dir() {
        home.join(&filename)
    } else {
        PathBuf::from(&filename)
    }
}
