use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Field, Ident, LitStr, Path};

use crate::utils;

/// How one struct field is exposed on the command line.
enum OptionKind {
    /// `--name <value>`.
    Value {
        name: String,
        value_label: Option<String>,
        parse_with: Option<Path>,
    },
    /// `--name[=<bool>]` plus `--no-name`.
    Flag { name: String },
}

fn option_kind(field: &Field) -> syn::Result<Option<OptionKind>> {
    let mut long = None;
    let mut flag = None;
    let mut value_label = None;
    let mut parse_with = None;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("cli")) {
        attr.parse_nested_meta(|meta| {
            let lit: LitStr = meta.value()?.parse()?;
            if meta.path.is_ident("long") {
                long = Some(lit.value());
            } else if meta.path.is_ident("flag") {
                flag = Some(lit.value());
            } else if meta.path.is_ident("value") {
                value_label = Some(lit.value());
            } else if meta.path.is_ident("parse_with") {
                parse_with = Some(lit.parse::<Path>()?);
            } else {
                return Err(meta.error(
                    "unsupported cli attribute; expected long/flag/value/parse_with",
                ));
            }
            Ok(())
        })?;
    }

    match (long, flag) {
        (Some(_), Some(_)) => Err(syn::Error::new_spanned(
            field,
            "cli field cannot be both `long` and `flag`",
        )),
        (None, Some(_)) if !utils::is_bool(&field.ty) => Err(syn::Error::new_spanned(
            &field.ty,
            "cli `flag` fields must be `bool`",
        )),
        (None, Some(name)) => Ok(Some(OptionKind::Flag { name })),
        (Some(name), None) => Ok(Some(OptionKind::Value {
            name,
            value_label,
            parse_with,
        })),
        (None, None) => Ok(None),
    }
}

/// Match arms for `apply_cli_option` and the matching usage lines.
fn option_arms(
    field_ident: &Ident,
    field: &Field,
    kind: OptionKind,
    usage: &mut String,
) -> Vec<TokenStream> {
    match kind {
        OptionKind::Flag { name } => {
            let on = utils::lit(&name);
            let off = utils::lit(&format!("no-{name}"));
            usage.push_str(&format!("  --{name}[=<bool>]\n  --no-{name}\n"));
            vec![
                quote! {
                    #on => {
                        self.#field_ident = match value {
                            Some(raw) => Self::parse_cli_bool(name, &raw)?,
                            None => true,
                        };
                        Ok(true)
                    }
                },
                quote! {
                    #off => {
                        if value.is_some() {
                            return Err(crate::Error::invalid_input(format!(
                                "Flag --{name} does not take a value"
                            )));
                        }
                        self.#field_ident = false;
                        Ok(true)
                    }
                },
            ]
        }
        OptionKind::Value {
            name,
            value_label,
            parse_with,
        } => {
            let label = value_label.unwrap_or_else(|| utils::type_label(&field.ty));
            usage.push_str(&format!("  --{name} <{label}>\n"));
            let name = utils::lit(&name);
            let parse = utils::parse_expr(&field.ty, parse_with.as_ref());
            vec![quote! {
                #name => {
                    let raw = value.ok_or_else(|| {
                        crate::Error::invalid_input(format!("Missing value for --{name}"))
                    })?;
                    self.#field_ident = #parse;
                    Ok(true)
                }
            }]
        }
    }
}

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let struct_ident = &input.ident;
    let mut arms = Vec::new();
    let mut usage = String::new();

    for field in utils::named_fields(input, "CliOptions")? {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        if let Some(kind) = option_kind(field)? {
            arms.extend(option_arms(field_ident, field, kind, &mut usage));
        }
    }
    let usage = utils::lit(&usage);

    Ok(quote! {
        impl #struct_ident {
            /// Splits `name=value`, or takes the next argument as the value unless it is
            /// another option.
            fn split_arg(
                raw_name: &str,
                args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
            ) -> (String, Option<String>) {
                if let Some((name, value)) = raw_name.split_once('=') {
                    return (name.to_string(), Some(value.to_string()));
                }
                let value = args.next_if(|next| !next.starts_with("--"));
                (raw_name.to_string(), value)
            }

            fn parse_cli_bool(name: &str, raw: &str) -> crate::Result<bool> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => Ok(true),
                    "0" | "false" | "no" | "off" => Ok(false),
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid boolean for --{name}: {raw} (expected true/false)"
                    ))),
                }
            }

            /// One line per option, in declaration order.
            pub fn cli_option_lines() -> &'static str {
                #usage
            }

            /// `Ok(false)` when `name` is not an option of this struct.
            fn apply_cli_option(
                &mut self,
                name: &str,
                value: Option<String>,
            ) -> crate::Result<bool> {
                match name {
                    #(#arms,)*
                    _ => Ok(false),
                }
            }
        }
    })
}
