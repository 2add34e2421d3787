use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, ItemFn, ReturnType, Type};

/// Expands `#[campus_runtime::main]` into a sync `main` that builds the selected runtime profile.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return Error::new_spanned(
            input.sig.fn_token,
            "#[campus_runtime::main] can only be used on async functions",
        )
        .to_compile_error();
    }

    if !returns_result(&input.sig.output) {
        return Error::new_spanned(
            &input.sig,
            "#[campus_runtime::main] requires the function to return a Result",
        )
        .to_compile_error();
    }

    let profile = match profile(args) {
        Ok(profile) => profile,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = #profile;
            ::campus_runtime::build_runtime_with_config(&config)?.block_on(async #block)
        }
    }
}

fn profile(args: TokenStream) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::campus_runtime::RuntimeConfig::default() });
    }

    let ident: syn::Ident = syn::parse2(args)?;
    let preset = match ident.to_string().as_str() {
        "high_performance" => quote! { ::campus_runtime::RuntimeConfig::high_performance() },
        "memory_efficient" => quote! { ::campus_runtime::RuntimeConfig::memory_efficient() },
        "default" => quote! { ::campus_runtime::RuntimeConfig::default() },
        _ => {
            return Err(Error::new_spanned(
                ident,
                "unknown runtime profile; use high_performance, memory_efficient or default",
            ));
        },
    };
    Ok(preset)
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    matches!(&**ty, Type::Path(path) if path.path.segments.last().is_some_and(|s| s.ident == "Result"))
}
