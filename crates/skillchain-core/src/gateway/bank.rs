//! Bank query accessors

use super::envelope::{amount_or_zero, unwrap_list};
use super::RestGateway;
use crate::error::ClientResult;
use crate::types::Coin;

const BANK: &str = "/cosmos/bank/v1beta1";

impl RestGateway {
    /// All spendable balances for an address.
    pub async fn balances(&self, address: &str) -> ClientResult<Vec<Coin>> {
        let envelope = self.get(&format!("{BANK}/balances/{address}")).await?;
        unwrap_list(envelope, "balances")
    }

    /// Balance of a single denomination, `"0"` when the address holds none.
    pub async fn balance_by_denom(&self, address: &str, denom: &str) -> ClientResult<String> {
        let envelope = self
            .get_with_query(
                &format!("{BANK}/balances/{address}/by_denom"),
                &[("denom", denom)],
            )
            .await?;
        Ok(amount_or_zero(&envelope, "balance"))
    }
}
