use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Field, Ident, LitStr};

use crate::utils;

/// One rendered `key = value` line.
struct Entry {
    key: String,
    value: TokenStream,
}

fn entry(field_ident: &Ident, field: &Field) -> syn::Result<Option<Entry>> {
    let mut key = field_ident.to_string();
    let mut mode = String::from("display");
    let mut skip = false;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("kv")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                return Ok(());
            }
            let value = meta.value()?.parse::<LitStr>()?.value();
            if meta.path.is_ident("name") {
                key = value;
            } else if meta.path.is_ident("fmt") {
                mode = value;
            } else {
                return Err(meta.error("unsupported kv attribute; expected name/fmt/skip"));
            }
            Ok(())
        })?;
    }
    if skip {
        return Ok(None);
    }

    let value = match mode.as_str() {
        "display" => quote! { &self.#field_ident },
        "debug" => quote! { &format!("{:?}", self.#field_ident) },
        "len" => quote! { &self.#field_ident.len() },
        "path" => quote! { &self.#field_ident.display() },
        "opt" => quote! {
            &self
                .#field_ident
                .as_ref()
                .map_or_else(|| String::from("-"), |v| v.to_string())
        },
        "empty_dash" => quote! {
            &if self.#field_ident.is_empty() {
                String::from("-")
            } else {
                self.#field_ident.to_string()
            }
        },
        other => {
            return Err(syn::Error::new_spanned(
                field,
                format!("unsupported kv fmt mode: {other}"),
            ));
        }
    };
    Ok(Some(Entry { key, value }))
}

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let struct_ident = &input.ident;
    let mut entries = Vec::new();
    for field in utils::named_fields(input, "KvDisplay")? {
        if let Some(field_ident) = &field.ident
            && let Some(entry) = entry(field_ident, field)?
        {
            entries.push(entry);
        }
    }

    // Keys are padded to the longest one; every line starts with a newline and a tab.
    let width = entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
    let template: String = entries
        .iter()
        .map(|e| format!("\n\t{:<width$} = {{}}", e.key))
        .collect();
    let template = utils::lit(&template);
    let values = entries.iter().map(|e| &e.value);

    Ok(quote! {
        impl std::fmt::Display for #struct_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, #template, #(#values),*)
            }
        }
    })
}
