use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ItemStruct;

/// Splits the annotated struct into `<Name>Inner` (the data) and `<Name>` (an `Arc` handle
/// that derefs to the data and registers as a kernel feature slice).
pub fn expand_slice(input: ItemStruct) -> TokenStream {
    let ItemStruct { attrs, vis, ident, generics, fields, semi_token, .. } = input;
    if !generics.params.is_empty() {
        return syn::Error::new_spanned(generics, "campus_slice does not support generics")
            .to_compile_error();
    }

    let inner = format_ident!("{ident}Inner");

    quote! {
        #(#attrs)*
        #vis struct #inner #fields #semi_token

        #[derive(Debug, Clone)]
        #vis struct #ident {
            inner: ::std::sync::Arc<#inner>,
        }

        impl #ident {
            #[must_use]
            pub fn new(inner: #inner) -> Self {
                Self { inner: ::std::sync::Arc::new(inner) }
            }
        }

        impl ::std::ops::Deref for #ident {
            type Target = #inner;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::campus_kernel::domain::registry::FeatureSlice for #ident {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    }
}
