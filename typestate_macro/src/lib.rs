use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::DeriveInput;
use syn::Error;
use syn::Result;
use syn::parse_macro_input;
use syn::spanned::Spanned;

/// Ensures the input is a `#[repr(transparent)]` single-field tuple struct.
/// Returns the inner field type on success.
fn transparent_inner(ast: &DeriveInput) -> Result<syn::Type> {
    let ident = &ast.ident;

    let mut is_transparent = false;
    for attr in &ast.attrs {
        if attr.path().is_ident("repr") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("transparent") {
                    is_transparent = true;
                }
                Ok(())
            })?;
        }
    }
    if !is_transparent {
        return Err(Error::new(
            ident.span(),
            "Struct must be #[repr(transparent)] to #[derive(RawReg)]",
        ));
    }

    match &ast.data {
        syn::Data::Struct(s) => match &s.fields {
            syn::Fields::Unnamed(t) if t.unnamed.len() == 1 => match t.unnamed.first() {
                Some(field) => Ok(field.ty.clone()),
                None => Err(Error::new(t.span(), "missing tuple field")),
            },
            _ => Err(Error::new(
                s.fields.span(),
                "Struct must be a single-field tuple struct to #[derive(RawReg)]",
            )),
        },
        _ => Err(Error::new(
            ast.span(),
            "Only tuple structs are supported by #[derive(RawReg)]",
        )),
    }
}

/// Derives `typestate::RawReg` plus mask-style bit operations for a
/// `#[repr(transparent)]` newtype over a 32-bit register value.
///
/// The generated impl also provides `empty()`, `bits()` and `contains()`
/// so the newtype reads like a flag set at call sites.
#[proc_macro_derive(RawReg)]
pub fn derive_rawreg(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand_rawreg(&ast)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand_rawreg(ast: &DeriveInput) -> Result<TokenStream2> {
    let ident = &ast.ident;
    let raw_ty = transparent_inner(ast)?;

    Ok(quote! {
        const _: [(); ::core::mem::size_of::<#ident>()] =
            [(); ::core::mem::size_of::<#raw_ty>()];
        const _: [(); ::core::mem::align_of::<#ident>()] =
            [(); ::core::mem::align_of::<#raw_ty>()];

        impl ::typestate::RawReg for #ident
        where
            #raw_ty: ::typestate::RawReg,
        {
            #[inline] fn to_raw(self) -> u32 { ::typestate::RawReg::to_raw(self.0) }
            #[inline] fn from_raw(raw: u32) -> Self { Self(::typestate::RawReg::from_raw(raw)) }
        }

        impl #ident {
            #[inline] pub const fn empty() -> Self { Self(0) }
            #[inline] pub const fn bits(self) -> #raw_ty { self.0 }
            #[inline] pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }
        }

        impl ::core::ops::BitOr for #ident {
            type Output = Self;
            #[inline] fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
        }
        impl ::core::ops::BitAnd for #ident {
            type Output = Self;
            #[inline] fn bitand(self, rhs: Self) -> Self { Self(self.0 & rhs.0) }
        }
        impl ::core::ops::BitXor for #ident {
            type Output = Self;
            #[inline] fn bitxor(self, rhs: Self) -> Self { Self(self.0 ^ rhs.0) }
        }
        impl ::core::ops::Not for #ident {
            type Output = Self;
            #[inline] fn not(self) -> Self { Self(!self.0) }
        }
        impl ::core::ops::BitOrAssign for #ident {
            #[inline] fn bitor_assign(&mut self, rhs: Self) { self.0 |= rhs.0; }
        }
        impl ::core::ops::BitAndAssign for #ident {
            #[inline] fn bitand_assign(&mut self, rhs: Self) { self.0 &= rhs.0; }
        }
    })
}
