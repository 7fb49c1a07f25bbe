use crate::core::{Invoice, InvoiceError, InvoiceStatus};

use super::format::{escape_html, format_date, format_sek, format_sek_kr};

/// Render an invoice as a complete, self-contained HTML document.
///
/// Output depends only on the invoice value: rendering the same invoice
/// twice yields byte-identical documents.
pub fn render_html(invoice: &Invoice) -> Result<String, InvoiceError> {
    let title = document_title(invoice);
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>{} - {}</title>\n",
        escape_html(title),
        escape_html(&invoice.invoice_number)
    ));
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n<div class=\"invoice-box\">\n");

    render_header(&mut html, invoice, title);
    render_customer(&mut html, invoice);
    render_table(&mut html, invoice);
    render_totals(&mut html, invoice);

    html.push_str(&format!(
        "<p class=\"vat-note\">{}</p>\n",
        escape_html(vat_basis_note(invoice))
    ));
    if let Some(notes) = &invoice.notes {
        html.push_str(&format!(
            "<p class=\"notes\">{}</p>\n",
            escape_html(notes)
        ));
    }

    render_payment(&mut html, invoice);
    render_footer(&mut html, invoice);

    html.push_str("</div>\n</body>\n</html>\n");
    Ok(html)
}

fn document_title(invoice: &Invoice) -> &'static str {
    if invoice.status == InvoiceStatus::CreditNote {
        "CREDIT NOTE"
    } else {
        "INVOICE"
    }
}

/// Explanatory note on the VAT basis, chosen by line composition.
fn vat_basis_note(invoice: &Invoice) -> &'static str {
    if invoice.is_fully_zero_rated() {
        "All amounts are exempt from VAT."
    } else if invoice.has_mixed_rates() {
        "Official fees are exempt from VAT. Service fees include 25% VAT."
    } else {
        "All amounts include 25% VAT."
    }
}

fn render_header(html: &mut String, invoice: &Invoice, title: &str) {
    let company = &invoice.company;
    html.push_str("<div class=\"invoice-header\">\n<div>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&company.name)));
    html.push_str(&format!(
        "<p>{}<br>{} {}<br>{}<br>{}</p>\n",
        escape_html(&company.address),
        escape_html(&company.postal_code),
        escape_html(&company.city),
        escape_html(&company.email),
        escape_html(&company.phone)
    ));
    html.push_str("</div>\n<div class=\"invoice-meta\">\n");
    html.push_str(&format!("<h2>{}</h2>\n<p>\n", escape_html(title)));
    html.push_str(&format!(
        "<strong>Invoice number:</strong> {}<br>\n",
        escape_html(&invoice.invoice_number)
    ));
    html.push_str(&format!(
        "<strong>Invoice date:</strong> {}<br>\n",
        format_date(invoice.issue_date)
    ));
    html.push_str(&format!(
        "<strong>Due date:</strong> {}<br>\n",
        format_date(invoice.due_date)
    ));
    if let Some(order_number) = &invoice.order_number {
        html.push_str(&format!(
            "<strong>Order number:</strong> {}\n",
            escape_html(order_number)
        ));
    }
    html.push_str("</p>\n</div>\n</div>\n");
}

fn render_customer(html: &mut String, invoice: &Invoice) {
    let customer = &invoice.customer;
    html.push_str("<div class=\"customer-info\">\n<h3>Bill to:</h3>\n<p>\n");
    if let Some(company_name) = customer
        .company_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
    {
        html.push_str(&format!(
            "<strong>{}</strong><br>\nAttn: {}<br>\n",
            escape_html(company_name),
            escape_html(&customer.full_name())
        ));
    } else {
        html.push_str(&format!("{}<br>\n", escape_html(&customer.full_name())));
    }
    html.push_str(&format!(
        "{}<br>\n{} {}<br>\n{}<br>\n{}\n",
        escape_html(&customer.address),
        escape_html(&customer.postal_code),
        escape_html(&customer.city),
        escape_html(&customer.email),
        escape_html(&customer.phone)
    ));
    if let Some(org_number) = &customer.org_number {
        html.push_str(&format!("<br>Org.nr: {}\n", escape_html(org_number)));
    }
    if let Some(vat_number) = &customer.vat_number {
        html.push_str(&format!("<br>VAT no: {}\n", escape_html(vat_number)));
    }
    html.push_str("</p>\n</div>\n");
}

fn render_table(html: &mut String, invoice: &Invoice) {
    html.push_str(
        "<table>\n<thead>\n<tr>\n<th>Description</th>\n<th class=\"num\">Qty</th>\n\
         <th class=\"num\">Unit price</th>\n<th class=\"num\">VAT %</th>\n\
         <th class=\"num\">Amount</th>\n</tr>\n</thead>\n<tbody>\n",
    );
    for item in &invoice.line_items {
        html.push_str(&format!(
            "<tr>\n<td>{}</td>\n<td class=\"num\">{}</td>\n<td class=\"num\">{}</td>\n\
             <td class=\"num\">{}%</td>\n<td class=\"num\">{}</td>\n</tr>\n",
            escape_html(&item.description),
            item.quantity,
            format_sek(item.unit_price),
            item.vat_rate.percent(),
            format_sek(item.total_price)
        ));
    }
    html.push_str("</tbody>\n</table>\n");
}

fn render_totals(html: &mut String, invoice: &Invoice) {
    let net = invoice.subtotal - invoice.vat_total;
    html.push_str("<div class=\"totals\">\n");
    html.push_str(&format!(
        "<div class=\"totals-row\"><span>Net total:</span><span>{}</span></div>\n",
        format_sek_kr(net)
    ));
    html.push_str(&format!(
        "<div class=\"totals-row\"><span>VAT:</span><span>{}</span></div>\n",
        format_sek_kr(invoice.vat_total)
    ));
    html.push_str(&format!(
        "<div class=\"totals-row total-due\"><span>Total due:</span><span>{}</span></div>\n",
        format_sek_kr(invoice.total_amount)
    ));
    html.push_str("</div>\n");
}

fn render_payment(html: &mut String, invoice: &Invoice) {
    html.push_str("<div class=\"payment-info\">\n<h3>Payment information</h3>\n<p>\n");
    html.push_str(&format!(
        "<strong>Bankgiro:</strong> {}<br>\n",
        escape_html(&invoice.company.bankgiro)
    ));
    html.push_str(&format!(
        "<strong>Reference:</strong> {}<br>\n",
        escape_html(&invoice.payment_reference)
    ));
    html.push_str(&format!(
        "<strong>Terms:</strong> {}<br>\n",
        escape_html(&invoice.payment_terms)
    ));
    html.push_str(&format!(
        "<strong>Due date:</strong> {}<br>\n",
        format_date(invoice.due_date)
    ));
    html.push_str(&format!(
        "<strong>Currency:</strong> {}\n</p>\n</div>\n",
        escape_html(&invoice.currency)
    ));
}

fn render_footer(html: &mut String, invoice: &Invoice) {
    let company = &invoice.company;
    html.push_str(&format!(
        "<div class=\"footer\">\n<p>{} | Org.nr: {} | VAT no: {}</p>\n</div>\n",
        escape_html(&company.name),
        escape_html(&company.org_number),
        escape_html(&company.vat_number)
    ));
}

const STYLE: &str = "<style>\n\
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }\n\
.invoice-box { max-width: 800px; margin: auto; padding: 30px; border: 1px solid #eee; \
box-shadow: 0 0 10px rgba(0, 0, 0, 0.15); }\n\
.invoice-header { display: flex; justify-content: space-between; margin-bottom: 20px; }\n\
.invoice-header h1 { color: #21497f; }\n\
.invoice-meta { text-align: right; }\n\
table { width: 100%; border-collapse: collapse; }\n\
th { padding: 10px; text-align: left; background-color: #f8f9fa; border-bottom: 2px solid #ddd; }\n\
td { padding: 10px; border-bottom: 1px solid #eee; }\n\
th.num, td.num { text-align: right; }\n\
.totals { width: 280px; margin-left: auto; margin-top: 16px; }\n\
.totals-row { display: flex; justify-content: space-between; padding: 4px 0; }\n\
.total-due { font-weight: bold; font-size: 1.15em; border-top: 2px solid #ddd; }\n\
.vat-note, .notes { color: #555; font-size: 13px; margin-top: 16px; }\n\
.payment-info { margin-top: 24px; }\n\
.footer { margin-top: 30px; text-align: center; color: #777; font-size: 12px; }\n\
</style>\n";
