//! Names defined by the broker control's API contract
//!
//! Field names are case-exact and delivered in Korean by the control.

/// TR codes understood by the bridge
pub struct TrCodes;

impl TrCodes {
    /// 예수금상세현황요청: orderable funds
    pub const ORDERABLE_FUNDS: &'static str = "opw00001";

    /// 계좌평가잔고내역요청: account evaluation and holdings
    pub const ACCOUNT_EVALUATION: &'static str = "opw00018";

    /// 당일거래량상위요청: daily volume ranking
    pub const VOLUME_RANKING: &'static str = "OPT10030";

    /// 거래량급증요청: volume upsurge ranking
    pub const UPSURGE_RANKING: &'static str = "OPT10023";
}

/// Names requests are issued under
///
/// The name is echoed back in every notification and is the only correlation
/// key available.
pub struct IssuingNames;

impl IssuingNames {
    pub const BUY_ORDER: &'static str = "BuyOrder";
    pub const SELL_ORDER: &'static str = "SellOrder";
    pub const CANCEL_ORDER: &'static str = "CancelOrder";

    pub const AVAILABLE_FUNDS: &'static str = "AvailableFunds";
    pub const HOLDINGS: &'static str = "Holdings";
    /// opw00018 issued on behalf of the combined account funds query
    pub const ACCOUNT_EVALUATION: &'static str = "AccountEvaluation";
    pub const TOP_VOLUME: &'static str = "TopVolume";
    pub const TOP_UPSURGE: &'static str = "TopUpsurge";

    /// Whether a notification under this name carries an order result
    pub fn is_order(name: &str) -> bool {
        name == Self::BUY_ORDER || name == Self::SELL_ORDER || name == Self::CANCEL_ORDER
    }
}

/// Base screen numbers, one block per issuing name
///
/// Each request is issued on its own screen drawn from the block starting at
/// its base, so a notification can be told apart from one meant for an
/// earlier request under the same name.
pub struct Screens;

impl Screens {
    /// Screens per block
    pub const BLOCK_SIZE: u16 = 20;

    pub const BUY_ORDER: &'static str = "1000";
    pub const SELL_ORDER: &'static str = "1020";
    pub const CANCEL_ORDER: &'static str = "1040";

    pub const AVAILABLE_FUNDS: &'static str = "2000";
    pub const HOLDINGS: &'static str = "2020";
    pub const ACCOUNT_EVALUATION: &'static str = "2040";
    pub const TOP_VOLUME: &'static str = "3000";
    pub const TOP_UPSURGE: &'static str = "3020";
}

/// Price-type code used for cancellations
pub const CANCEL_PRICE_TYPE: &str = "1";

/// Fields of the order-result reply
pub mod order_fields {
    pub const ORDER_NUMBER: &str = "주문번호";
    pub const STATE: &str = "주문상태";
    pub const QUANTITY: &str = "주문수량";
    pub const PRICE: &str = "주문가격";
}

/// Fields shared by several TR replies
pub mod fields {
    pub const ACCOUNT_NO: &str = "계좌번호";
    pub const PASSWORD: &str = "비밀번호";
    pub const PASSWORD_MEDIA: &str = "비밀번호입력매체구분";
    pub const QUERY_KIND: &str = "조회구분";

    pub const DEPOSIT: &str = "예수금";
    pub const AVAILABLE_FUNDS: &str = "주문가능금액";
    pub const TOTAL_PURCHASE: &str = "총매입금액";

    /// Holdings rows use 종목번호; ranking rows use 종목코드
    pub const HOLDING_CODE: &str = "종목번호";
    pub const STOCK_CODE: &str = "종목코드";
    pub const STOCK_NAME: &str = "종목명";
    pub const HOLDING_QUANTITY: &str = "보유수량";
    pub const PURCHASE_PRICE: &str = "매입가";
    pub const CURRENT_PRICE: &str = "현재가";
    pub const VOLUME: &str = "거래량";
    pub const TURNOVER: &str = "거래금액";
    pub const PREVIOUS_VOLUME: &str = "이전거래량";
    pub const CURRENT_VOLUME: &str = "현재거래량";
    pub const FLUCTUATION_RATE: &str = "등락률";
}

/// Keys accepted by `get_login_info`
pub mod login_keys {
    pub const USER_ID: &str = "USER_ID";
    pub const USER_NAME: &str = "USER_NAME";
    pub const SERVER_KIND: &str = "SERVER_GUBUN";
    pub const KEYBOARD_SECURITY: &str = "KEY_BSECGB";
    pub const FIREWALL: &str = "FIREW_SECGB";
}
