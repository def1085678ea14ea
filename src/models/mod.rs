// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AgeRange, Ages, DonorPreference, Gender, GenderPref, Principal, RecipientApplication, RecipientRecord, Role,
    Wishlist, WishlistItem,
};
pub use requests::{
    AgesInput, AttachDocumentRequest, RegisterRecipientRequest, SaveWishlistsRequest, SetPreferenceRequest,
    WishlistItemRequest,
};
pub use responses::{
    ClaimedRecipient, ClaimedRecipientsResponse, EligibleRecipientsResponse, ErrorResponse, HealthResponse,
    PendingRecipientsResponse, RecipientSummary, WishlistsResponse,
};
