use std::io;

use clap::{Args, ValueEnum};
use storefront::{
    prelude::{Catalog, Theme},
    summary::write_catalog,
};
use storefront_app::context::AppContext;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeArg {
    Naruto,
    OnePiece,
    Kaiju,
    Bleach,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Naruto => Theme::Naruto,
            ThemeArg::OnePiece => Theme::OnePiece,
            ThemeArg::Kaiju => Theme::Kaiju,
            ThemeArg::Bleach => Theme::Bleach,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Only list products of this theme
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,
}

pub(crate) fn run(context: &AppContext, args: &ProductsArgs) -> Result<(), String> {
    let catalog = &context.catalog;

    let written = match args.theme {
        Some(theme) => write_catalog(io::stdout().lock(), &catalog.products_by_theme(theme.into())),
        None => write_catalog(io::stdout().lock(), catalog.products()),
    };

    written.map_err(|error| error.to_string())
}
