//! Deterministic content model for the PDF renderer.
//!
//! Everything that decides what ends up where on a page happens here,
//! in pure code over the invoice value: description wrapping, row
//! striping, pagination against fixed vertical bounds, and totals-box
//! placement. The `pdf` module only serializes this model.

use crate::core::{Invoice, InvoiceStatus};

use super::format::{format_date, format_sek, format_sek_kr};

/// A4 portrait, points.
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN: f32 = 40.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Height of one table row unit; a wrapped description consumes two.
pub const ROW_HEIGHT: f32 = 16.0;

/// Column widths as fractions of the content width. Description gets
/// the dominant share.
pub const COL_FRACTIONS: [f32; 5] = [0.44, 0.08, 0.18, 0.08, 0.22];

/// Top of the table on the first page (below header and bill-to) and on
/// continuation pages.
pub const TABLE_TOP_FIRST: f32 = PAGE_HEIGHT - 300.0;
pub const TABLE_TOP_CONT: f32 = PAGE_HEIGHT - 100.0;

/// Lower bound of the table body; below it sits the footer band.
pub const TABLE_BOTTOM: f32 = 120.0;

/// Vertical room required by the totals box, VAT note, and payment
/// block on the page where they are drawn.
pub const TOTALS_BLOCK_HEIGHT: f32 = 210.0;

/// Row units that fit on the first and on continuation pages.
pub const FIRST_PAGE_ROW_UNITS: usize = ((TABLE_TOP_FIRST - TABLE_BOTTOM) / ROW_HEIGHT) as usize;
pub const CONT_PAGE_ROW_UNITS: usize = ((TABLE_TOP_CONT - TABLE_BOTTOM) / ROW_HEIGHT) as usize;

/// Character budget per description line at the table font size.
pub const DESC_CHARS_PER_LINE: usize = 46;

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1 or 2 display lines of the description.
    pub desc_lines: Vec<String>,
    pub qty: String,
    pub unit_price: String,
    pub vat: String,
    pub amount: String,
    /// Alternating stripe, by data-row index across pages.
    pub shaded: bool,
}

impl TableRow {
    /// Vertical units this row consumes.
    pub fn units(&self) -> usize {
        self.desc_lines.len()
    }
}

/// One page of table rows. The header row is re-emitted on every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPage {
    pub rows: Vec<TableRow>,
    /// False for the first page, which carries the full document header.
    pub continued: bool,
}

impl LayoutPage {
    /// Y coordinate where this page's table starts.
    pub fn table_top(&self) -> f32 {
        if self.continued {
            TABLE_TOP_CONT
        } else {
            TABLE_TOP_FIRST
        }
    }

    fn capacity(&self) -> usize {
        if self.continued {
            CONT_PAGE_ROW_UNITS
        } else {
            FIRST_PAGE_ROW_UNITS
        }
    }

    fn used_units(&self) -> usize {
        // One unit for the header row.
        1 + self.rows.iter().map(TableRow::units).sum::<usize>()
    }
}

/// A line of the bill-to block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillToLine {
    pub text: String,
    pub bold: bool,
}

/// The totals summary box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsBox {
    pub net: String,
    pub vat: String,
    pub total_due: String,
}

/// Complete content model of a rendered invoice PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLayout {
    /// "INVOICE" or "CREDIT NOTE".
    pub doc_title: String,
    pub issuer_name: String,
    /// Label/value pairs shown right-aligned under the header band.
    pub meta: Vec<(String, String)>,
    pub issuer_lines: Vec<String>,
    pub bill_to: Vec<BillToLine>,
    pub pages: Vec<LayoutPage>,
    pub totals: TotalsBox,
    pub vat_note: String,
    pub notes: Option<String>,
    pub payment_lines: Vec<String>,
    pub footer: String,
    /// Page index where the totals block is drawn; equal to
    /// `pages.len()` when it needs a page of its own.
    pub totals_page: usize,
    /// Y coordinate where the totals block starts on that page.
    pub totals_start_y: f32,
}

/// Conventional file name for a downloaded invoice PDF.
pub fn invoice_pdf_filename(invoice: &Invoice) -> String {
    let reference = invoice
        .order_number
        .as_deref()
        .unwrap_or(&invoice.invoice_number);
    format!("Invoice {reference}.pdf")
}

/// Project an invoice into the page content model.
pub fn layout_invoice(invoice: &Invoice) -> InvoiceLayout {
    let doc_title = if invoice.status == InvoiceStatus::CreditNote {
        "CREDIT NOTE".to_string()
    } else {
        "INVOICE".to_string()
    };

    let mut meta = vec![
        ("Invoice number".to_string(), invoice.invoice_number.clone()),
        ("Invoice date".to_string(), format_date(invoice.issue_date)),
        ("Due date".to_string(), format_date(invoice.due_date)),
    ];
    if let Some(order_number) = &invoice.order_number {
        meta.push(("Order number".to_string(), order_number.clone()));
    }

    let company = &invoice.company;
    let issuer_lines = vec![
        company.address.clone(),
        format!("{} {}", company.postal_code, company.city),
        company.email.clone(),
        company.phone.clone(),
    ];

    let bill_to = bill_to_lines(invoice);
    let pages = paginate(invoice);

    let net = invoice.subtotal - invoice.vat_total;
    let totals = TotalsBox {
        net: format_sek_kr(net),
        vat: format_sek_kr(invoice.vat_total),
        total_due: format_sek_kr(invoice.total_amount),
    };

    let vat_note = if invoice.is_fully_zero_rated() {
        "All amounts are exempt from VAT.".to_string()
    } else if invoice.has_mixed_rates() {
        "Official fees are exempt from VAT. Service fees include 25% VAT.".to_string()
    } else {
        "All amounts include 25% VAT.".to_string()
    };

    let payment_lines = vec![
        format!("Bankgiro: {}", company.bankgiro),
        format!("Reference: {}", invoice.payment_reference),
        format!("Terms: {}", invoice.payment_terms),
        format!("Due date: {}", format_date(invoice.due_date)),
        format!("Currency: {}", invoice.currency),
    ];

    let footer = format!(
        "{} | Org.nr: {} | VAT no: {}",
        company.name, company.org_number, company.vat_number
    );

    // Place the totals block after the last table row, or on a page of
    // its own when the remaining space is too small.
    let (totals_page, totals_start_y) = match pages.last() {
        Some(last) => {
            let y_after_rows =
                last.table_top() - (last.used_units() as f32) * ROW_HEIGHT - 12.0;
            if y_after_rows - TOTALS_BLOCK_HEIGHT < TABLE_BOTTOM - 60.0 {
                (pages.len(), TABLE_TOP_CONT)
            } else {
                (pages.len() - 1, y_after_rows)
            }
        }
        None => (0, TABLE_TOP_FIRST),
    };

    InvoiceLayout {
        doc_title,
        issuer_name: company.name.clone(),
        meta,
        issuer_lines,
        bill_to,
        pages,
        totals,
        vat_note,
        notes: invoice.notes.clone(),
        payment_lines,
        footer,
        totals_page,
        totals_start_y,
    }
}

/// Company name first in bold with the person as an "Attn:" line, else
/// the person's name as the primary line.
fn bill_to_lines(invoice: &Invoice) -> Vec<BillToLine> {
    let customer = &invoice.customer;
    let mut lines = Vec::new();
    match customer
        .company_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
    {
        Some(company_name) => {
            lines.push(BillToLine {
                text: company_name.to_string(),
                bold: true,
            });
            lines.push(BillToLine {
                text: format!("Attn: {}", customer.full_name()),
                bold: false,
            });
        }
        None => lines.push(BillToLine {
            text: customer.full_name(),
            bold: true,
        }),
    }
    lines.push(BillToLine {
        text: customer.address.clone(),
        bold: false,
    });
    lines.push(BillToLine {
        text: format!("{} {}", customer.postal_code, customer.city),
        bold: false,
    });
    if let Some(org_number) = &customer.org_number {
        lines.push(BillToLine {
            text: format!("Org.nr: {org_number}"),
            bold: false,
        });
    }
    lines
}

fn paginate(invoice: &Invoice) -> Vec<LayoutPage> {
    let mut pages = Vec::new();
    let mut current = LayoutPage {
        rows: Vec::new(),
        continued: false,
    };

    for (index, item) in invoice.line_items.iter().enumerate() {
        let row = TableRow {
            desc_lines: wrap_description(&item.description),
            qty: item.quantity.to_string(),
            unit_price: format_sek(item.unit_price),
            vat: format!("{}%", item.vat_rate.percent()),
            amount: format_sek(item.total_price),
            shaded: index % 2 == 1,
        };

        if current.used_units() + row.units() > current.capacity() {
            pages.push(std::mem::replace(
                &mut current,
                LayoutPage {
                    rows: Vec::new(),
                    continued: true,
                },
            ));
        }
        current.rows.push(row);
    }

    pages.push(current);
    pages
}

/// Word-wrap a description into at most two display lines, truncating
/// the second with an ellipsis if it still overflows.
fn wrap_description(text: &str) -> Vec<String> {
    if text.chars().count() <= DESC_CHARS_PER_LINE {
        return vec![text.to_string()];
    }

    let mut first = String::new();
    let mut rest = String::new();
    for word in text.split_whitespace() {
        let fits_first = rest.is_empty()
            && first.chars().count() + word.chars().count() + usize::from(!first.is_empty())
                <= DESC_CHARS_PER_LINE;
        let target = if fits_first { &mut first } else { &mut rest };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(word);
    }

    if first.is_empty() {
        // A single unbreakable token longer than the budget; hard-split.
        first = rest.chars().take(DESC_CHARS_PER_LINE).collect();
        rest = rest.chars().skip(DESC_CHARS_PER_LINE).collect();
    }

    if rest.chars().count() > DESC_CHARS_PER_LINE {
        rest = rest
            .chars()
            .take(DESC_CHARS_PER_LINE.saturating_sub(3))
            .collect::<String>()
            + "...";
    }

    if rest.is_empty() {
        vec![first]
    } else {
        vec![first, rest]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompanyInfo, CustomerInfo, LineItem, VatRate};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn line(id: u32, description: &str) -> LineItem {
        LineItem {
            id: id.to_string(),
            description: description.to_string(),
            quantity: 1,
            unit_price: dec!(100),
            total_price: dec!(125.00),
            vat_rate: VatRate::Standard,
            vat_amount: dec!(25.00),
            service_type: None,
            official_fee: None,
            service_fee: None,
        }
    }

    fn invoice(lines: Vec<LineItem>) -> Invoice {
        let issued = Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap();
        Invoice {
            id: None,
            invoice_number: "INV-2024-000001".into(),
            order_id: "order_1".into(),
            order_number: Some("SWE000044".into()),
            customer: CustomerInfo {
                first_name: "Anna".into(),
                last_name: "Lind".into(),
                email: "anna@example.se".into(),
                phone: "070-0000000".into(),
                address: "Storgatan 1".into(),
                postal_code: "111 22".into(),
                city: "Stockholm".into(),
                country_code: "SE".into(),
                company_name: None,
                org_number: None,
                vat_number: None,
            },
            line_items: lines,
            subtotal: dec!(125.00),
            vat_total: dec!(25.00),
            total_amount: dec!(125.00),
            currency: "SEK".into(),
            issue_date: issued,
            due_date: issued,
            status: InvoiceStatus::Draft,
            payment_terms: "Payment within 30 days".into(),
            payment_reference: "INV-2024-000001".into(),
            notes: None,
            related_invoice_id: None,
            company: CompanyInfo {
                name: "Nordisk Legalisering AB".into(),
                address: "Box 38".into(),
                postal_code: "121 25".into(),
                city: "Stockholm".into(),
                country_code: "SE".into(),
                org_number: "556123-4567".into(),
                vat_number: "SE556123456701".into(),
                phone: "08-1234567".into(),
                email: "info@example.se".into(),
                bankgiro: "123-4567".into(),
            },
            created_at: issued,
            updated_at: issued,
        }
    }

    #[test]
    fn filename_prefers_order_number() {
        let inv = invoice(vec![line(1, "Apostille")]);
        assert_eq!(invoice_pdf_filename(&inv), "Invoice SWE000044.pdf");
        let mut inv = inv;
        inv.order_number = None;
        assert_eq!(invoice_pdf_filename(&inv), "Invoice INV-2024-000001.pdf");
    }

    #[test]
    fn short_description_single_line() {
        assert_eq!(wrap_description("Apostille"), vec!["Apostille"]);
    }

    #[test]
    fn long_description_wraps_to_two_lines() {
        let text = "Embassy legalization of commercial documents including chamber certification";
        let lines = wrap_description(text);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].chars().count() <= DESC_CHARS_PER_LINE);
        assert!(lines[1].chars().count() <= DESC_CHARS_PER_LINE);
    }

    #[test]
    fn overlong_description_truncated_with_ellipsis() {
        let word = "x".repeat(60);
        let text = format!("{word} {word} {word}");
        let lines = wrap_description(&text);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("..."));
    }

    #[test]
    fn single_page_for_small_invoice() {
        let layout = layout_invoice(&invoice(vec![line(1, "Apostille")]));
        assert_eq!(layout.pages.len(), 1);
        assert!(!layout.pages[0].continued);
        assert_eq!(layout.totals_page, 0);
    }

    #[test]
    fn overflow_paginates_and_continues() {
        let lines: Vec<LineItem> = (0..40).map(|i| line(i, "Notarization")).collect();
        let layout = layout_invoice(&invoice(lines));
        assert!(layout.pages.len() > 1);
        assert!(!layout.pages[0].continued);
        assert!(layout.pages[1].continued);
        // No page exceeds its unit capacity.
        for page in &layout.pages {
            assert!(page.used_units() <= page.capacity());
        }
    }

    #[test]
    fn striping_alternates_across_pages() {
        let lines: Vec<LineItem> = (0..40).map(|i| line(i, "Notarization")).collect();
        let layout = layout_invoice(&invoice(lines));
        let all_rows: Vec<&TableRow> = layout.pages.iter().flat_map(|p| &p.rows).collect();
        for (i, row) in all_rows.iter().enumerate() {
            assert_eq!(row.shaded, i % 2 == 1);
        }
    }

    #[test]
    fn pagination_is_deterministic() {
        let lines: Vec<LineItem> = (0..33).map(|i| line(i, "Chamber of Commerce legalization")).collect();
        let inv = invoice(lines);
        assert_eq!(layout_invoice(&inv), layout_invoice(&inv));
    }

    #[test]
    fn company_bill_to_prioritizes_company() {
        let mut inv = invoice(vec![line(1, "Apostille")]);
        inv.customer.company_name = Some("Lind Konsult AB".into());
        let layout = layout_invoice(&inv);
        assert_eq!(layout.bill_to[0].text, "Lind Konsult AB");
        assert!(layout.bill_to[0].bold);
        assert_eq!(layout.bill_to[1].text, "Attn: Anna Lind");
    }
}
