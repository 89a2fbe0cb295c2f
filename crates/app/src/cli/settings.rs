use std::{io, io::Write};

use clap::Args;
use storefront::{
    api::{RestaurantId, StorefrontApi},
    fulfillment::FulfillmentSettings,
};
use storefront_app::render;

use super::describe;

#[derive(Debug, Args)]
pub(crate) struct SettingsArgs {
    /// Restaurant id
    #[arg(short, long)]
    restaurant: u64,
}

pub(crate) async fn run(api: &dyn StorefrontApi, args: SettingsArgs) -> Result<(), String> {
    let restaurant = api
        .get_restaurant(RestaurantId::new(args.restaurant))
        .await
        .map_err(|error| format!("failed to load restaurant: {}", describe(&error)))?;

    let settings = FulfillmentSettings::resolve(restaurant.delivery_settings.as_ref());
    let mut out = io::stdout().lock();

    render::write_settings(&mut out, &settings).map_err(|error| error.to_string())?;

    if !settings.is_usable() {
        writeln!(out, "No fulfillment method is currently available.")
            .map_err(|error| error.to_string())?;
    }

    Ok(())
}
