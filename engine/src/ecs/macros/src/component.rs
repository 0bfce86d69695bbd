use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

pub fn derive_component(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);

    // Get the type name we are annotating
    let type_name = &ast.ident;

    // Use ::ember_engine::ecs::Component, which works both inside and outside
    // the crate. Inside, it resolves because of `extern crate self as
    // ember_engine;` in lib.rs; outside, it resolves to the dependency.
    TokenStream::from(quote! {
        impl ::ember_engine::ecs::Component for #type_name {
        }
    })
}
