//! Derive and attribute macros shared by the PCI planner crates.

mod cli_options;
mod cli_value;
mod kv_display;
mod timer;
mod utils;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Logs the wall time spent in the annotated function at `info` level.
///
/// An optional string literal overrides the label, e.g. `#[timer("optimizer")]`.
#[proc_macro_attribute]
pub fn timer(attr: TokenStream, item: TokenStream) -> TokenStream {
    timer::timer_inner(attr, item)
}

/// String parsing and `Display` for unit enums used as option values.
#[proc_macro_derive(CliValue, attributes(cli_value, cli))]
pub fn derive_cli_value(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    finish(cli_value::expand(&input))
}

/// `--long value` / `--flag` parsing for an options struct.
#[proc_macro_derive(CliOptions, attributes(cli))]
pub fn derive_cli_options(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    finish(cli_options::expand(&input))
}

/// Multi-line `key = value` `Display`, used when logging options.
#[proc_macro_derive(KvDisplay, attributes(kv))]
pub fn derive_kv_display(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    finish(kv_display::expand(&input))
}

fn finish(expanded: syn::Result<proc_macro2::TokenStream>) -> TokenStream {
    expanded
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
