use crate::models::CheckoutState;
use safar_core::{CoreError, GatewayError};
use safar_passenger::RosterError;
use safar_seating::SelectionError;
use safar_shared::SeatId;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Not signed in: {0}")]
    MissingCredentials(#[source] CoreError),

    #[error("Ticket snapshot unavailable")]
    MissingSnapshot,

    #[error("Bus layout rejected: {0}")]
    InvalidLayout(#[source] SelectionError),

    #[error("No passenger bound to seat {0}")]
    UnknownSeat(SeatId),

    #[error("No active reservation session")]
    NoSession,

    #[error("Order {reference_number} already exists for this session")]
    OrderPending { reference_number: String },

    #[error("No payment method chosen")]
    NoPaymentMethod,

    #[error("Passengers have not been saved")]
    PassengersNotSaved,

    #[error("No passenger is complete and valid")]
    PassengersInvalid,

    #[error("Saving passengers failed: {0}")]
    SavePassengers(#[source] RosterError),

    #[error("Order creation failed: {0}")]
    CreateOrder(#[source] GatewayError),

    #[error("Payment URL request failed for order {reference_number}: {source}")]
    PaymentUrl {
        reference_number: String,
        #[source]
        source: GatewayError,
    },

    #[error("Reservation expired")]
    ReservationExpired,

    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidTransition { from: CheckoutState, to: CheckoutState },

    #[error("Redirect failed: {0}")]
    Redirect(#[source] CoreError),
}

impl CheckoutError {
    /// Text for the toast shown to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::MissingCredentials(_) => "لطفا دوباره وارد حساب کاربری شوید".to_string(),
            CheckoutError::MissingSnapshot => {
                "اطلاعات بلیت در دسترس نیست. لطفا دوباره جستجو کنید".to_string()
            }
            CheckoutError::InvalidLayout(_) => "نقشه صندلی‌های اتوبوس معتبر نیست".to_string(),
            CheckoutError::UnknownSeat(_) => "این صندلی انتخاب نشده است".to_string(),
            CheckoutError::NoSession => {
                "رزرو فعالی وجود ندارد. لطفا دوباره صندلی انتخاب کنید".to_string()
            }
            CheckoutError::OrderPending { reference_number } => format!(
                "سفارش شما با کد پیگیری {} ثبت شده است. لطفا با پشتیبانی تماس بگیرید",
                reference_number
            ),
            CheckoutError::NoPaymentMethod => "لطفا درگاه پرداخت را انتخاب کنید".to_string(),
            CheckoutError::PassengersNotSaved => {
                "لطفا ابتدا اطلاعات مسافران را ثبت کنید".to_string()
            }
            CheckoutError::PassengersInvalid => {
                "لطفا اطلاعات حداقل یک مسافر را کامل کنید".to_string()
            }
            CheckoutError::SavePassengers(RosterError::InvalidBuyerPhone) => {
                "شماره موبایل خریدار معتبر نیست".to_string()
            }
            CheckoutError::SavePassengers(_) => "ذخیره اطلاعات مسافران با خطا مواجه شد".to_string(),
            CheckoutError::CreateOrder(GatewayError::Rejected(message)) if !message.is_empty() => {
                message.clone()
            }
            CheckoutError::CreateOrder(_) => "ثبت سفارش با خطا مواجه شد".to_string(),
            CheckoutError::PaymentUrl { reference_number, .. } => format!(
                "دریافت لینک پرداخت ناموفق بود. کد پیگیری سفارش: {}",
                reference_number
            ),
            CheckoutError::ReservationExpired => "زمان رزرو شما به پایان رسید".to_string(),
            CheckoutError::InvalidTransition { .. } => "این عملیات در حال حاضر ممکن نیست".to_string(),
            CheckoutError::Redirect(_) => "انتقال به درگاه پرداخت ناموفق بود".to_string(),
        }
    }
}
