use crate::args::TopArgs;
use crate::commands::Out;
use crate::db::TopSeller;
use crate::{Config, Result};

/// Lists the best-selling products in the store. Uses `top_n` from the config when no limit is
/// given.
pub async fn top(config: Config, args: TopArgs) -> Result<Out<Vec<TopSeller>>> {
    let limit = args.limit().unwrap_or_else(|| config.top_n());
    let sellers = config.db().top_selling_items(limit).await?;
    Ok(Out::new(top_sellers_message(limit, &sellers), sellers))
}

pub(super) fn top_sellers_message(limit: u32, sellers: &[TopSeller]) -> String {
    if sellers.is_empty() {
        return "No sales have been loaded yet".to_string();
    }
    let mut message = format!("Top {limit} best-selling items:");
    for seller in sellers {
        message.push_str(&format!("\n- {}: {} units", seller.name, seller.quantity));
    }
    message
}
