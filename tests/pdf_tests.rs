use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use fakturera::core::{
    CompanyInfo, CustomerInfo, Invoice, InvoiceStatus, LineItem, VatRate,
};
use fakturera::render::{FIRST_PAGE_ROW_UNITS, render_pdf};

fn line(id: u32, description: &str) -> LineItem {
    LineItem {
        id: id.to_string(),
        description: description.into(),
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
    let subtotal: rust_decimal::Decimal = lines.iter().map(|l| l.total_price).sum();
    let vat_total: rust_decimal::Decimal = lines.iter().map(|l| l.vat_amount).sum();
    Invoice {
        id: Some("inv_000001".into()),
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
            company_name: Some("Lind Konsult AB".into()),
            org_number: Some("556000-0000".into()),
            vat_number: None,
        },
        line_items: lines,
        subtotal,
        vat_total,
        total_amount: subtotal,
        currency: "SEK".into(),
        issue_date: issued,
        due_date: issued + chrono::Duration::days(30),
        status: InvoiceStatus::Draft,
        payment_terms: "Payment within 30 days".into(),
        payment_reference: "INV-2024-000001".into(),
        notes: Some("Handled with care by the legalization team.".into()),
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

fn page_count(bytes: &[u8]) -> usize {
    let doc = lopdf::Document::load_mem(bytes).expect("generated PDF must parse");
    doc.get_pages().len()
}

#[test]
fn produces_a_parseable_single_page_pdf() {
    let bytes = render_pdf(&invoice(vec![line(1, "Apostille - official fee")])).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.5"));
    assert_eq!(page_count(&bytes), 1);
}

#[test]
fn long_invoice_spans_multiple_pages() {
    let lines: Vec<LineItem> = (0..(2 * FIRST_PAGE_ROW_UNITS) as u32)
        .map(|i| line(i, "Notarization of commercial documents"))
        .collect();
    let bytes = render_pdf(&invoice(lines)).unwrap();
    assert!(page_count(&bytes) >= 2);
}

#[test]
fn rendering_is_deterministic() {
    let inv = invoice(vec![
        line(1, "Apostille - official fee"),
        line(2, "Service fee (Apostille)"),
    ]);
    assert_eq!(render_pdf(&inv).unwrap(), render_pdf(&inv).unwrap());
}

#[test]
fn text_content_contains_invoice_number() {
    let bytes = render_pdf(&invoice(vec![line(1, "Apostille")])).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let text = doc.extract_text(&[1]).unwrap();
    assert!(text.contains("INV-2024-000001"));
    assert!(text.contains("Lind Konsult AB"));
    assert!(text.contains("Total due:"));
}
