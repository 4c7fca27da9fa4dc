//! Plain-text payment summary, suitable for pasting into a chat.

use std::fmt::Write as _;

use crate::ledger::Stats;
use crate::model::Trip;

/// Width of the rule under the summary header.
const RULE_WIDTH: usize = 50;

/// Format an amount as Brazilian reais, e.g. `R$ 60,00`.
#[must_use]
pub fn format_money(amount: f64) -> String {
    format!("R$ {amount:.2}").replace('.', ",")
}

/// Render the share text for a week's trips.
#[must_use]
pub fn share_text(trips: &[Trip], stats: &Stats, week_name: &str) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "📅 Status de Pagamento de Caronas - {week_name}");
    let _ = writeln!(text, "💰 Total Recebido: {}", format_money(stats.total_received));
    let _ = writeln!(text, "👥 Pagamentos Concluídos: {}", stats.payers);
    text.push_str(&"=".repeat(RULE_WIDTH));
    text.push_str("\n\n");

    if trips.is_empty() {
        text.push_str("Nenhuma viagem cadastrada nesta semana ativa.");
        return text;
    }

    for trip in trips {
        let _ = writeln!(text, "📅 {} - {}:", trip.day, trip.trip_type);
        for p in &trip.participants {
            let status = if p.paid { "✅ PAGO" } else { "❌ PENDENTE" };
            let _ = writeln!(text, "- {}: {status}", p.name);
        }
        text.push('\n');
    }
    text
}
