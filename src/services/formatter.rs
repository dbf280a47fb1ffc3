//! Telegram message rendering for recorded signals.
//!
//! Output uses Telegram's HTML parse mode. Rendering is pure: the wall-clock
//! time shown in the message is passed in by the caller.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{Action, Signal};

/// Known Tadawul tickers and the names traders recognise them by.
const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("TADAWUL:2222", "أرامكو السعودية"),
    ("TADAWUL:1180", "البنك الأهلي"),
    ("TADAWUL:7010", "STC"),
    ("TADAWUL:1211", "معادن"),
    ("TADAWUL:1120", "الراجحي"),
    ("TADAWUL:2010", "سابك"),
    ("TADAWUL:5110", "الكهرباء"),
    ("TADAWUL:2280", "المراعي"),
];

/// Take-profit multiplier applied to BUY entries (+3%).
const TAKE_PROFIT_FACTOR: Decimal = Decimal::from_parts(103, 0, 0, false, 2);
/// Stop-loss multiplier applied to BUY entries (-2%).
const STOP_LOSS_FACTOR: Decimal = Decimal::from_parts(98, 0, 0, false, 2);

const CURRENCY: &str = "ريال";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

struct Framing {
    icon: &'static str,
    label: &'static str,
    strength: &'static str,
}

fn framing(action: Action) -> Framing {
    match action {
        Action::Buy => Framing {
            icon: "🟢",
            label: "شراء",
            strength: "قوية",
        },
        Action::Sell => Framing {
            icon: "🔴",
            label: "بيع",
            strength: "قوية",
        },
        Action::Alert => Framing {
            icon: "🟡",
            label: "تنبيه",
            strength: "متوسطة",
        },
    }
}

/// Human name for a known ticker.
pub fn display_name(symbol: &str) -> Option<&'static str> {
    DISPLAY_NAMES
        .iter()
        .find(|(ticker, _)| *ticker == symbol)
        .map(|(_, name)| *name)
}

/// Take-profit and stop-loss levels for a BUY at `price`. None for anything else.
pub fn risk_levels(action: Action, price: Decimal) -> Option<(Decimal, Decimal)> {
    if action == Action::Buy && price > Decimal::ZERO {
        Some((price * TAKE_PROFIT_FACTOR, price * STOP_LOSS_FACTOR))
    } else {
        None
    }
}

/// Render the notification for a stored signal.
pub fn format_signal_message(signal: &Signal, now: NaiveDateTime) -> String {
    let Framing {
        icon,
        label,
        strength,
    } = framing(signal.action);

    let symbol = escape_html(&signal.symbol);
    let name = display_name(&signal.symbol)
        .map(str::to_string)
        .unwrap_or_else(|| symbol.clone());

    let mut text = format!(
        "{icon} <b>توصية {label} - {strength}</b>\n\n\
         📊 <b>السهم:</b> {name} ({symbol})\n\
         💰 <b>السعر:</b> {price} {CURRENCY}\n\n\
         <b>📉 المؤشرات (Real-time):</b>\n",
        price = fixed(signal.price, 2),
    );

    if let Some(strategy) = &signal.strategy {
        text.push_str(&format!("• <b>الاستراتيجية:</b> {}\n", escape_html(strategy)));
    }

    if let Some(count) = &signal.signal_count {
        text.push_str(&format!("• <b>إشارات إيجابية:</b> {}\n", escape_html(count)));
    }

    if let Some(rsi) = signal.rsi {
        let zone = if rsi < Decimal::from(30) {
            "تشبع بيعي"
        } else if rsi > Decimal::from(70) {
            "تشبع شرائي"
        } else {
            "متعادل"
        };
        text.push_str(&format!("• RSI: {} ({zone})\n", fixed(rsi, 1)));
    }

    if let Some(macd) = signal.macd {
        let trend = if macd > Decimal::ZERO { "إيجابي" } else { "سلبي" };
        text.push_str(&format!("• MACD: {} ({trend})\n", signed(macd, 2)));
    }

    if let Some(volume) = signal.volume {
        text.push_str(&format!("• حجم التداول: {}\n", grouped(volume)));
    }

    if let Some((take_profit, stop_loss)) = risk_levels(signal.action, signal.price) {
        text.push_str("\n<b>🎯 إدارة المخاطر:</b>\n");
        text.push_str(&format!(
            "• Take Profit: {} {CURRENCY} (+3%)\n",
            fixed(take_profit, 2)
        ));
        text.push_str(&format!(
            "• Stop Loss: {} {CURRENCY} (-2%)\n",
            fixed(stop_loss, 2)
        ));
    }

    if let Some(message) = &signal.message {
        text.push_str(&format!("\n<b>🔍 التحليل:</b>\n{}\n", escape_html(message)));
    }

    text.push_str(&format!(
        "\n⏰ <b>الوقت:</b> {}\n",
        now.format(TIME_FORMAT)
    ));
    text.push_str("\n⚠️ <i>هذه توصية تعليمية. استشر مستشاراً مالياً قبل اتخاذ أي قرار.</i>");

    text
}

/// One-shot message announcing that the relay is up.
pub fn format_startup_message(now: NaiveDateTime) -> String {
    format!(
        "🚀 <b>خادم Webhook المتقدم بدأ العمل!</b>\n\n\
         ✅ <b>الحالة:</b> يعمل بشكل مستمر 24/7\n\n\
         📊 <b>الميزات:</b>\n\
         • استقبال إشارات TradingView\n\
         • توصيات فورية على Telegram\n\
         • قاعدة بيانات متكاملة\n\
         • تتبع أداء تلقائي\n\n\
         ⏰ <b>بدأ في:</b> {}",
        now.format(TIME_FORMAT)
    )
}

/// Round half away from zero and always print exactly `dp` decimals.
fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}

/// Like [`fixed`] but with an explicit sign: `+0.35`, `-1.20`.
fn signed(value: Decimal, dp: u32) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        '-'
    } else {
        '+'
    };
    format!("{sign}{}", fixed(value.abs(), dp))
}

/// Whole number with thousands separators: `1,234,567`.
fn grouped(value: Decimal) -> String {
    let digits = fixed(value.abs(), 0);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value.is_sign_negative() && digits.chars().any(|c| c != '0') {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
