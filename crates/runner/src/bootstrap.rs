//! Bootstrap - seed the simulated control with sample data
//!
//! Master data and ranking rows come from [`DEMO_STOCKS`]; account replies are
//! fixed amounts formatted the way the broker sends them (thousands separators,
//! zero-padded prices).

use kiwi_ports::codes::{TrCodes, fields, login_keys};
use kiwi_sim::{ScriptedRecord, SimConfig, SimulatedControl, TrScript};
use log::info;

/// A listed stock used by the demo session
#[derive(Debug, Clone, Copy)]
pub struct DemoStock {
    pub code: &'static str,
    pub name: &'static str,
    pub last_price: i64,
    pub volume: i64,
}

pub const DEMO_STOCKS: [DemoStock; 5] = [
    DemoStock {
        code: "005930",
        name: "삼성전자",
        last_price: 71_500,
        volume: 18_234_511,
    },
    DemoStock {
        code: "000660",
        name: "SK하이닉스",
        last_price: 182_000,
        volume: 4_120_337,
    },
    DemoStock {
        code: "035420",
        name: "NAVER",
        last_price: 201_500,
        volume: 912_004,
    },
    DemoStock {
        code: "035720",
        name: "카카오",
        last_price: 47_850,
        volume: 3_377_290,
    },
    DemoStock {
        code: "005380",
        name: "현대차",
        last_price: 243_000,
        volume: 702_118,
    },
];

/// Format with thousands separators, e.g. `1,250,000`
fn grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

fn holdings_record() -> ScriptedRecord {
    let positions = [(&DEMO_STOCKS[0], 30_i64, 68_200_i64), (&DEMO_STOCKS[2], 5, 195_000)];
    let total: i64 = positions.iter().map(|(_, qty, cost)| qty * cost).sum();

    positions.iter().fold(
        ScriptedRecord::new().with_field(fields::TOTAL_PURCHASE, grouped(total)),
        |record, (stock, qty, cost)| {
            let code = format!("A{}", stock.code);
            let quantity = grouped(*qty);
            let cost = grouped(*cost);
            let price = grouped(stock.last_price);
            record.with_row(&[
                (fields::HOLDING_CODE, code.as_str()),
                (fields::STOCK_NAME, stock.name),
                (fields::HOLDING_QUANTITY, quantity.as_str()),
                (fields::PURCHASE_PRICE, cost.as_str()),
                (fields::CURRENT_PRICE, price.as_str()),
            ])
        },
    )
}

fn volume_record() -> ScriptedRecord {
    DEMO_STOCKS
        .iter()
        .fold(ScriptedRecord::new(), |record, stock| {
            let price = format!("+{}", stock.last_price);
            let volume = stock.volume.to_string();
            let turnover = (stock.volume * stock.last_price / 1_000_000).to_string();
            record.with_row(&[
                (fields::STOCK_CODE, stock.code),
                (fields::STOCK_NAME, stock.name),
                (fields::CURRENT_PRICE, price.as_str()),
                (fields::VOLUME, volume.as_str()),
                (fields::TURNOVER, turnover.as_str()),
            ])
        })
}

fn upsurge_record() -> ScriptedRecord {
    DEMO_STOCKS
        .iter()
        .rev()
        .enumerate()
        .fold(ScriptedRecord::new(), |record, (rank, stock)| {
            let price = stock.last_price.to_string();
            let previous = (stock.volume / 4).to_string();
            let current = stock.volume.to_string();
            let rate = format!("+{}.{:02}", 9 - rank, (rank * 17) % 100);
            record.with_row(&[
                (fields::STOCK_CODE, stock.code),
                (fields::STOCK_NAME, stock.name),
                (fields::CURRENT_PRICE, price.as_str()),
                (fields::PREVIOUS_VOLUME, previous.as_str()),
                (fields::CURRENT_VOLUME, current.as_str()),
                (fields::FLUCTUATION_RATE, rate.as_str()),
            ])
        })
}

/// Start a simulated control loaded with the demo data set
pub fn seeded_control(config: SimConfig) -> kiwi_sim::Result<SimulatedControl> {
    let control = SimulatedControl::with_config(config)?;

    for stock in &DEMO_STOCKS {
        control.set_master(stock.code, stock.name, &format!("{:08}", stock.last_price));
    }

    control.set_login_info(login_keys::USER_ID, "demo01");
    control.set_login_info(login_keys::USER_NAME, "데모사용자");
    control.set_login_info(login_keys::SERVER_KIND, "1");
    control.set_login_info(login_keys::KEYBOARD_SECURITY, "0");
    control.set_login_info(login_keys::FIREWALL, "1");

    control.script_tr(
        TrCodes::ORDERABLE_FUNDS,
        TrScript::Reply(
            ScriptedRecord::new()
                .with_field(fields::DEPOSIT, grouped(10_000_000))
                .with_field(fields::AVAILABLE_FUNDS, grouped(8_500_000)),
        ),
    );
    control.script_tr(TrCodes::ACCOUNT_EVALUATION, TrScript::Reply(holdings_record()));
    control.script_tr(TrCodes::VOLUME_RANKING, TrScript::Reply(volume_record()));
    control.script_tr(TrCodes::UPSURGE_RANKING, TrScript::Reply(upsurge_record()));

    info!("Seeded simulated control with {} stocks", DEMO_STOCKS.len());
    Ok(control)
}
