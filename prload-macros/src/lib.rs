use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Ident, ItemFn};

/// Proc macro to denote a Transaction
///
/// Wraps the body of an `async fn` returning `Result<T, E>` so that every call is timed, counted
/// as a success or error, and paced by the scenario's request-rate limit (if any).
///
/// # Example
/// ```ignore
/// use prload::prelude::*;
///
/// #[transaction]
/// async fn my_transaction(arg_1: u32, arg_2: &str) -> Result<String, MyError> {
///     ...
/// }
/// ```
#[proc_macro_attribute]
pub fn transaction(attr: TokenStream, item: TokenStream) -> TokenStream {
    transaction_internal(attr, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn transaction_internal(_attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream2> {
    let input = syn::parse::<ItemFn>(item)?;

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;

    if sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            sig.fn_token,
            "#[transaction] only works on async functions",
        ));
    }

    let name = &sig.ident;
    let stmts = &block.stmts;

    Ok(quote! {
        #(#attrs)* #vis #sig {
            ::prload::transaction::transaction_hook(
                ::prload::TransactionLabels {
                    success: concat!(stringify!(#name), "_success"),
                    error: concat!(stringify!(#name), "_error"),
                    latency: concat!(stringify!(#name), "_latency"),
                },
                async move {
                    #(#stmts)*
                },
            )
            .await
        }
    })
}

/// Proc macro to denote a Scenario
///
/// The function must be `async` and take a single `VuContext` argument, which identifies the
/// virtual user and iteration being run. The macro replaces it with a zero-argument function of
/// the same name returning a configurable scenario.
///
/// See the `Scenario` struct for more information on the methods this macro provides on functions.
///
/// # Example
/// ```ignore
/// use prload::prelude::*;
///
/// #[scenario]
/// async fn my_scenario(ctx: VuContext) {
/// }
/// ```
#[proc_macro_attribute]
pub fn scenario(attr: TokenStream, item: TokenStream) -> TokenStream {
    scenario_internal(attr, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn scenario_internal(_attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream2> {
    let input = syn::parse::<ItemFn>(item)?;

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;

    if sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            sig.fn_token,
            "#[scenario] only works on async functions",
        ));
    }

    if sig.inputs.len() != 1 {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            "#[scenario] functions take exactly one `VuContext` argument",
        ));
    }

    let new_name = Ident::new(&format!("__prload_{}", sig.ident), Span::call_site());
    let mut new_sig = sig.clone();
    new_sig.ident = new_name.clone();

    let mut scen_sig = sig.clone();
    let scen_name = sig.ident.clone();
    scen_sig.asyncness = None;
    scen_sig.inputs.clear();
    scen_sig.output = syn::parse2(quote! {
        -> impl ::prload::scenario::ConfigurableScenario<::prload::RunStatistics>
    })?;

    Ok(quote! {
        #(#attrs)* #vis #scen_sig {
            ::prload::scenario::Scenario::new(stringify!(#scen_name), #new_name)
        }

        #[doc(hidden)]
        #vis #new_sig #block
    })
}
