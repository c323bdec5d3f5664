#![no_std]

// Address of a `Region` record in guest memory. `0` means "no region".
type RegionPtr = u32;
// Index of a promise in the pending schedule of the current invocation.
type PromiseIdx = u32;
type StatusCode = u32;
type Gas = u32;

#[link(wasm_import_module = "env")]
extern "C" {
    /*
     * Misc API
     */
    // Prints the UTF-8 message stored in the region. Only linked by debug hosts.
    pub fn debug(message: RegionPtr);
    // Aborts the transaction, every storage change is rolled back
    pub fn panic(message: RegionPtr) -> !;
    // Adds an event to the transaction receipt. `args` is an argument blob, 0 for none
    pub fn emit_event(name: RegionPtr, args: RegionPtr);
    /*
     * Storage API
     */
    pub fn set_storage(key: RegionPtr, value: RegionPtr);
    // 0 if the key is not present
    pub fn get_storage(key: RegionPtr) -> RegionPtr;
    pub fn remove_storage(key: RegionPtr);
    /*
     * Context API
     */
    pub fn block_timestamp() -> i64;
    pub fn block_number() -> u64;
    pub fn block_seed() -> RegionPtr;
    pub fn min_fee_per_gas() -> RegionPtr;
    pub fn network_size() -> u64;
    pub fn epoch() -> u32;
    // Coins attached to the current call
    pub fn pay_amount() -> RegionPtr;
    // Protobuf encoded identity, 0 if the identity doesn't exist
    pub fn identity(address: RegionPtr) -> RegionPtr;
    pub fn identity_state(address: RegionPtr) -> u32;
    pub fn caller() -> RegionPtr;
    pub fn original_caller() -> RegionPtr;
    pub fn contract() -> RegionPtr;
    // Same as `contract`, exported by newer hosts
    pub fn own_addr() -> RegionPtr;
    pub fn balance(address: RegionPtr) -> RegionPtr;
    pub fn code_hash() -> RegionPtr;
    #[link_name = "own_code"]
    pub fn code() -> RegionPtr;
    #[link_name = "contract_addr"]
    pub fn contract_address(code: RegionPtr, args: RegionPtr, nonce: RegionPtr) -> RegionPtr;
    #[link_name = "contract_addr_by_hash"]
    pub fn contract_address_by_hash(hash: RegionPtr, args: RegionPtr, nonce: RegionPtr)
        -> RegionPtr;
    /*
     * Promise API
     */
    pub fn create_call_function_promise(
        contract: RegionPtr,
        method: RegionPtr,
        args: RegionPtr,
        deposit: RegionPtr,
        gas_limit: Gas,
    ) -> PromiseIdx;
    pub fn create_deploy_contract_promise(
        code: RegionPtr,
        args: RegionPtr,
        nonce: RegionPtr,
        deposit: RegionPtr,
        gas_limit: Gas,
    ) -> PromiseIdx;
    pub fn create_transfer_promise(to: RegionPtr, amount: RegionPtr);
    // Reads `key` from the storage of another contract
    pub fn create_read_contract_data_promise(
        contract: RegionPtr,
        key: RegionPtr,
        gas_limit: Gas,
    ) -> PromiseIdx;
    // Settles with the protobuf encoded identity of `address`
    pub fn create_get_identity_promise(address: RegionPtr, gas_limit: Gas) -> PromiseIdx;
    pub fn promise_then(
        promise_idx: PromiseIdx,
        method: RegionPtr,
        args: RegionPtr,
        deposit: RegionPtr,
        gas_limit: Gas,
    );
    // 0 - failed, 1 - empty value, 2 - the value is written to `result`
    pub fn promise_result(result: RegionPtr) -> StatusCode;
}
