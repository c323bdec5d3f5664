use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::FnArg;
use syn::ImplItemMethod;
use syn::ItemImpl;
use syn::Type;
use syn::Visibility;

/// Returns `true` for `&mut Context<..>`, the parameter that receives the invocation
/// context instead of a host argument.
fn is_context(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => match reference.elem.as_ref() {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .map(|segment| segment.ident == "Context")
                .unwrap_or(false),
            _ => false,
        },
        _ => false,
    }
}

fn entry_point(struct_type: &Type, method: &ImplItemMethod) -> syn::Result<TokenStream2> {
    let ident = &method.sig.ident;
    let mut has_receiver = false;
    let mut raw_params = TokenStream2::new();
    let mut decode = TokenStream2::new();
    let mut call_args = TokenStream2::new();

    for (i, arg) in method.sig.inputs.iter().enumerate() {
        match arg {
            FnArg::Receiver(receiver) => {
                if receiver.reference.is_none() {
                    return Err(syn::Error::new_spanned(
                        receiver,
                        "#[contract] methods can't take `self` by value.",
                    ));
                }
                has_receiver = true;
            }
            FnArg::Typed(typed) if is_context(&typed.ty) => {
                call_args.extend(quote! { &mut ctx, });
            }
            FnArg::Typed(typed) => {
                let ty = &typed.ty;
                let raw = format_ident!("raw_{}", i);
                let value = format_ident!("arg_{}", i);
                raw_params.extend(quote! { #raw: u32, });
                decode.extend(quote! {
                    let #value: #ty = ctx.arg::<#ty>(#raw);
                });
                call_args.extend(quote! { #value, });
            }
        }
    }

    let call = if has_receiver {
        quote! {
            let mut contract = <#struct_type as ::core::default::Default>::default();
            let result = contract.#ident(#call_args);
        }
    } else {
        quote! {
            let result = <#struct_type>::#ident(#call_args);
        }
    };

    let (output, ret) = match method.sig.output {
        syn::ReturnType::Default => (quote! {}, quote! {}),
        syn::ReturnType::Type(_, _) => (
            quote! { -> u32 },
            quote! { idena_sdk::args::into_region(&result) },
        ),
    };

    Ok(quote! {
        #[cfg(target_arch = "wasm32")]
        #[no_mangle]
        #[allow(unused_mut, unused_variables)]
        pub extern "C" fn #ident(#raw_params) #output {
            idena_sdk::setup_panic_hook();
            let mut ctx = idena_sdk::Context::new(idena_sdk::env::Runtime);
            #decode
            #call
            #ret
        }
    })
}

/// Walks over public methods and generates an exported entry point for each method it finds.
///
/// Every argument of the method, except the `&mut Context<H>` one, is received from the
/// host as a region handle and decoded with `idena_sdk::args::Argument`. A method that
/// takes `&self` is called on `Default::default()` of the contract type. When the method
/// returns a value, the wrapper encodes it the same way and returns its region handle to
/// the host.
///
/// # Example
/// ```ignore
/// use idena_sdk::{contract, Context, Host};
///
/// #[derive(Default)]
/// pub struct Function;
///
/// #[contract]
/// impl Function {
///     pub fn inc<H: Host>(_ctx: &mut Context<H>, x: u64) -> u64 {
///         x + 1
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn contract(_attr: TokenStream, item: TokenStream) -> TokenStream {
    if let Ok(input) = syn::parse::<ItemImpl>(item) {
        let struct_type = &input.self_ty;
        let mut generated_code = TokenStream2::new();
        for item in &input.items {
            match item {
                syn::ImplItem::Method(method) => {
                    if !matches!(method.vis, Visibility::Public(_)) {
                        continue;
                    }
                    match entry_point(struct_type, method) {
                        Ok(tokens) => generated_code.extend(tokens),
                        Err(err) => return TokenStream::from(err.to_compile_error()),
                    }
                }
                syn::ImplItem::Const(_) => {}
                _ => {
                    return TokenStream::from(
                        syn::Error::new(
                            Span::call_site(),
                            "#[contract] only supports methods and constants for now.",
                        )
                        .to_compile_error(),
                    )
                }
            }
        }

        TokenStream::from(quote! {
            #input
            #generated_code
        })
    } else {
        TokenStream::from(
            syn::Error::new(
                Span::call_site(),
                "#[contract] can only be used on impl sections.",
            )
            .to_compile_error(),
        )
    }
}
