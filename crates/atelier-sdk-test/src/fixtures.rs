use atelier_sdk_rpc::{ReceiptStatus, TransactionReceipt};
use atelier_sdk_types::{Address, AssetRecord, AssetStatus, ContentId, TxHash};

pub fn test_address(byte: u8) -> Address {
    Address::new([byte; 20])
}

pub fn test_tx_hash(byte: u8) -> TxHash {
    TxHash::new([byte; 32])
}

/// An asset record ready to mint against `contract`.
pub fn metadata_ready_asset(id: u64, contract: Address) -> AssetRecord {
    let mut record = AssetRecord::new(
        id,
        format!("Artwork #{id}"),
        "A test artwork",
        ContentId::new("bafy-image").expect("valid cid"),
        ContentId::new("bafy-cert").expect("valid cid"),
        ContentId::new("bafy-meta").expect("valid cid"),
        7,
        contract,
    );
    record.status = AssetStatus::MetadataReady;
    record
}

/// An asset record that already minted `token_id` on `contract`.
pub fn minted_asset(id: u64, token_id: u64, contract: Address) -> AssetRecord {
    let mut record = metadata_ready_asset(id, contract);
    record.status = AssetStatus::Minted;
    record.token_id = Some(token_id);
    record.tx_hash = Some(test_tx_hash(0xaa));
    record.minted_by = Some(test_address(0x52));
    record.minted_contract = Some(contract);
    record
}

/// A receipt for a transaction that executed successfully.
pub fn success_receipt(
    tx_hash: TxHash,
    sender: Address,
    token_id: Option<u64>,
) -> TransactionReceipt {
    TransactionReceipt {
        tx_hash,
        block_number: 1_482_203,
        status: ReceiptStatus::Succeeded,
        sender,
        token_id,
        contract: None,
        revert_reason: None,
    }
}

/// A receipt for a transaction that reverted.
pub fn reverted_receipt(tx_hash: TxHash, sender: Address, reason: &str) -> TransactionReceipt {
    TransactionReceipt {
        tx_hash,
        block_number: 1_482_203,
        status: ReceiptStatus::Reverted,
        sender,
        token_id: None,
        contract: None,
        revert_reason: Some(reason.to_string()),
    }
}
