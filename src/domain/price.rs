/// Price in the smallest unit of whatever currency the service charges in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Price(i32);

impl Price {
    pub fn parse(amount: i64) -> Result<Price, String> {
        if amount < 0 {
            return Err(format!("{} is negative", amount));
        }

        i32::try_from(amount)
            .map(Self)
            .map_err(|_| format!("{} is too large", amount))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}
