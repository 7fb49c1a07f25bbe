//! PDF serialization of the invoice content model.
//!
//! Takes the deterministic [`InvoiceLayout`](super::layout::InvoiceLayout)
//! and draws it with lopdf: colored header band, bill-to block, striped
//! line-item table with per-page header rows, right-anchored totals box,
//! VAT note, payment block, and a footer band with issuer identifiers.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::core::{Invoice, InvoiceError};

use super::layout::{
    CONTENT_WIDTH, COL_FRACTIONS, InvoiceLayout, LayoutPage, MARGIN, PAGE_HEIGHT, PAGE_WIDTH,
    ROW_HEIGHT, TABLE_TOP_CONT, layout_invoice,
};

const HEADER_BLUE: Rgb = (0.13, 0.29, 0.50);
const STRIPE_GRAY: Rgb = (0.955, 0.955, 0.955);
const HEADER_ROW_GRAY: Rgb = (0.90, 0.92, 0.95);
const TOTALS_GRAY: Rgb = (0.93, 0.94, 0.96);
const TEXT_DARK: Rgb = (0.15, 0.15, 0.15);
const TEXT_MUTED: Rgb = (0.40, 0.40, 0.40);
const WHITE: Rgb = (1.0, 1.0, 1.0);

const BAND_HEIGHT_FIRST: f32 = 80.0;
const BAND_HEIGHT_CONT: f32 = 36.0;
const FOOTER_BAND_HEIGHT: f32 = 46.0;
const TOTALS_BOX_WIDTH: f32 = 230.0;

type Rgb = (f32, f32, f32);

/// Render an invoice to PDF bytes.
///
/// # Errors
///
/// [`InvoiceError::Render`] when the PDF document cannot be encoded.
pub fn render_pdf(invoice: &Invoice) -> Result<Vec<u8>, InvoiceError> {
    let layout = layout_invoice(invoice);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_regular),
            "F2" => Object::Reference(font_bold),
        },
    });

    let mut page_contents: Vec<Vec<Operation>> = Vec::new();
    for (index, page) in layout.pages.iter().enumerate() {
        let mut ops = Vec::new();
        draw_page_chrome(&mut ops, &layout, page);
        draw_table(&mut ops, page);
        if layout.totals_page == index {
            draw_tail_blocks(&mut ops, &layout, layout.totals_start_y);
        }
        draw_footer(&mut ops, &layout);
        page_contents.push(ops);
    }
    if layout.totals_page == layout.pages.len() {
        // The totals did not fit under the table; give them a page.
        let mut ops = Vec::new();
        draw_continuation_band(&mut ops, &layout);
        draw_tail_blocks(&mut ops, &layout, TABLE_TOP_CONT);
        draw_footer(&mut ops, &layout);
        page_contents.push(ops);
    }

    let mut kids: Vec<Object> = Vec::new();
    for ops in page_contents {
        let content = Content { operations: ops };
        let encoded = content
            .encode()
            .map_err(|e| InvoiceError::Render(format!("failed to encode page content: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![num(0.0), num(0.0), num(PAGE_WIDTH), num(PAGE_HEIGHT)],
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| InvoiceError::Render(format!("failed to save PDF: {e}")))?;
    Ok(bytes)
}

/// Header band, metadata, issuer block, and bill-to block.
fn draw_page_chrome(ops: &mut Vec<Operation>, layout: &InvoiceLayout, page: &LayoutPage) {
    if page.continued {
        draw_continuation_band(ops, layout);
        return;
    }

    fill_rect(
        ops,
        0.0,
        PAGE_HEIGHT - BAND_HEIGHT_FIRST,
        PAGE_WIDTH,
        BAND_HEIGHT_FIRST,
        HEADER_BLUE,
    );
    text(
        ops,
        "F2",
        16.0,
        MARGIN,
        PAGE_HEIGHT - 48.0,
        WHITE,
        &layout.issuer_name,
    );
    text_right(
        ops,
        "F2",
        18.0,
        PAGE_WIDTH - MARGIN,
        PAGE_HEIGHT - 48.0,
        WHITE,
        &layout.doc_title,
    );

    // Issuer address block left, invoice metadata right-aligned.
    let mut y = PAGE_HEIGHT - BAND_HEIGHT_FIRST - 18.0;
    for line in &layout.issuer_lines {
        text(ops, "F1", 9.0, MARGIN, y, TEXT_MUTED, line);
        y -= 12.0;
    }
    let mut y = PAGE_HEIGHT - BAND_HEIGHT_FIRST - 18.0;
    for (label, value) in &layout.meta {
        text_right(
            ops,
            "F1",
            9.0,
            PAGE_WIDTH - MARGIN,
            y,
            TEXT_DARK,
            &format!("{label}: {value}"),
        );
        y -= 13.0;
    }

    let mut y = PAGE_HEIGHT - 190.0;
    text(ops, "F2", 10.0, MARGIN, y, TEXT_DARK, "Bill to:");
    y -= 14.0;
    for line in &layout.bill_to {
        let font = if line.bold { "F2" } else { "F1" };
        text(ops, font, 9.5, MARGIN, y, TEXT_DARK, &line.text);
        y -= 12.0;
    }
}

fn draw_continuation_band(ops: &mut Vec<Operation>, layout: &InvoiceLayout) {
    fill_rect(
        ops,
        0.0,
        PAGE_HEIGHT - BAND_HEIGHT_CONT,
        PAGE_WIDTH,
        BAND_HEIGHT_CONT,
        HEADER_BLUE,
    );
    let number = layout
        .meta
        .first()
        .map(|(_, value)| value.as_str())
        .unwrap_or_default();
    text(
        ops,
        "F2",
        11.0,
        MARGIN,
        PAGE_HEIGHT - 24.0,
        WHITE,
        &format!("{} {number} (continued)", layout.doc_title),
    );
}

/// Table header row plus striped data rows.
fn draw_table(ops: &mut Vec<Operation>, page: &LayoutPage) {
    let top = page.table_top();
    let col_x = column_positions();

    fill_rect(
        ops,
        MARGIN,
        top - ROW_HEIGHT,
        CONTENT_WIDTH,
        ROW_HEIGHT,
        HEADER_ROW_GRAY,
    );
    let header_y = top - ROW_HEIGHT + 4.5;
    text(ops, "F2", 9.0, col_x[0] + 4.0, header_y, TEXT_DARK, "Description");
    text_right(ops, "F2", 9.0, col_x[2] - 4.0, header_y, TEXT_DARK, "Qty");
    text_right(ops, "F2", 9.0, col_x[3] - 4.0, header_y, TEXT_DARK, "Unit price");
    text_right(ops, "F2", 9.0, col_x[4] - 4.0, header_y, TEXT_DARK, "VAT %");
    text_right(
        ops,
        "F2",
        9.0,
        MARGIN + CONTENT_WIDTH - 4.0,
        header_y,
        TEXT_DARK,
        "Amount",
    );

    let mut y = top - ROW_HEIGHT;
    for row in &page.rows {
        let row_height = row.units() as f32 * ROW_HEIGHT;
        if row.shaded {
            fill_rect(ops, MARGIN, y - row_height, CONTENT_WIDTH, row_height, STRIPE_GRAY);
        }
        let baseline = y - ROW_HEIGHT + 4.5;
        for (i, desc) in row.desc_lines.iter().enumerate() {
            text(
                ops,
                "F1",
                9.0,
                col_x[0] + 4.0,
                baseline - i as f32 * ROW_HEIGHT,
                TEXT_DARK,
                desc,
            );
        }
        text_right(ops, "F1", 9.0, col_x[2] - 4.0, baseline, TEXT_DARK, &row.qty);
        text_right(ops, "F1", 9.0, col_x[3] - 4.0, baseline, TEXT_DARK, &row.unit_price);
        text_right(ops, "F1", 9.0, col_x[4] - 4.0, baseline, TEXT_DARK, &row.vat);
        text_right(
            ops,
            "F1",
            9.0,
            MARGIN + CONTENT_WIDTH - 4.0,
            baseline,
            TEXT_DARK,
            &row.amount,
        );
        y -= row_height;
    }
}

/// Totals box, VAT note, optional notes, and payment block.
fn draw_tail_blocks(ops: &mut Vec<Operation>, layout: &InvoiceLayout, start_y: f32) {
    let box_x = PAGE_WIDTH - MARGIN - TOTALS_BOX_WIDTH;
    let label_x = box_x + 8.0;
    let value_x = PAGE_WIDTH - MARGIN - 8.0;
    let mut y = start_y;

    fill_rect(ops, box_x, y - 58.0, TOTALS_BOX_WIDTH, 58.0, TOTALS_GRAY);
    text(ops, "F1", 9.0, label_x, y - 14.0, TEXT_DARK, "Net total:");
    text_right(ops, "F1", 9.0, value_x, y - 14.0, TEXT_DARK, &layout.totals.net);
    text(ops, "F1", 9.0, label_x, y - 28.0, TEXT_DARK, "VAT:");
    text_right(ops, "F1", 9.0, value_x, y - 28.0, TEXT_DARK, &layout.totals.vat);
    text(ops, "F2", 11.0, label_x, y - 47.0, TEXT_DARK, "Total due:");
    text_right(
        ops,
        "F2",
        11.0,
        value_x,
        y - 47.0,
        TEXT_DARK,
        &layout.totals.total_due,
    );
    y -= 76.0;

    text(ops, "F1", 8.0, MARGIN, y, TEXT_MUTED, &layout.vat_note);
    y -= 14.0;
    if let Some(notes) = &layout.notes {
        for chunk in wrap_plain(notes, 100) {
            text(ops, "F1", 8.0, MARGIN, y, TEXT_MUTED, &chunk);
            y -= 11.0;
        }
    }
    y -= 8.0;

    text(ops, "F2", 10.0, MARGIN, y, TEXT_DARK, "Payment information");
    y -= 14.0;
    for line in &layout.payment_lines {
        text(ops, "F1", 9.0, MARGIN, y, TEXT_DARK, line);
        y -= 12.0;
    }
}

fn draw_footer(ops: &mut Vec<Operation>, layout: &InvoiceLayout) {
    fill_rect(ops, 0.0, 0.0, PAGE_WIDTH, FOOTER_BAND_HEIGHT, HEADER_ROW_GRAY);
    let width = estimate_width(&layout.footer, 8.0);
    text(
        ops,
        "F1",
        8.0,
        (PAGE_WIDTH - width) / 2.0,
        18.0,
        TEXT_MUTED,
        &layout.footer,
    );
}

/// Left x of each column, plus the right edge is `MARGIN + CONTENT_WIDTH`.
fn column_positions() -> [f32; 5] {
    let mut x = MARGIN;
    let mut positions = [0.0; 5];
    for (i, fraction) in COL_FRACTIONS.iter().enumerate() {
        positions[i] = x;
        x += fraction * CONTENT_WIDTH;
    }
    positions
}

/// Split text into chunks of at most `max_chars`, breaking on spaces.
fn wrap_plain(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn num(value: f32) -> Object {
    Object::Real(value)
}

/// Helvetica has no fixed advance; half the font size per character is
/// a close enough estimate for right-alignment and centering.
fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Map to Latin-1 for the WinAnsi-encoded standard fonts; anything
/// outside becomes '?'.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF { code as u8 } else { b'?' }
        })
        .collect()
}

fn text(
    ops: &mut Vec<Operation>,
    font: &str,
    size: f32,
    x: f32,
    y: f32,
    color: Rgb,
    content: &str,
) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "rg",
        vec![num(color.0), num(color.1), num(color.2)],
    ));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), num(size)],
    ));
    ops.push(Operation::new("Td", vec![num(x), num(y)]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(latin1(content), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn text_right(
    ops: &mut Vec<Operation>,
    font: &str,
    size: f32,
    right_x: f32,
    y: f32,
    color: Rgb,
    content: &str,
) {
    let x = right_x - estimate_width(content, size);
    text(ops, font, size, x, y, color, content);
}

fn fill_rect(ops: &mut Vec<Operation>, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
    ops.push(Operation::new(
        "rg",
        vec![num(color.0), num(color.1), num(color.2)],
    ));
    ops.push(Operation::new(
        "re",
        vec![num(x), num(y), num(width), num(height)],
    ));
    ops.push(Operation::new("f", vec![]));
}
