use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{ItemFn, LitStr, parse_macro_input};

pub fn timer_inner(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);

    let label = if attr.is_empty() {
        LitStr::new(&func.sig.ident.to_string(), Span::call_site())
    } else {
        parse_macro_input!(attr as LitStr)
    };

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = func;

    // The guard logs on drop so early returns and `?` are timed too.
    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            struct __TimerGuard(&'static str, ::std::time::Instant);

            impl ::std::ops::Drop for __TimerGuard {
                fn drop(&mut self) {
                    ::log::info!(
                        "{}: done time={:.3}s",
                        self.0,
                        self.1.elapsed().as_secs_f64()
                    );
                }
            }

            let __timer_guard = __TimerGuard(#label, ::std::time::Instant::now());
            #block
        }
    };

    TokenStream::from(expanded)
}
